//! In-memory fakes and fixtures shared by the unit and route tests.

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, response::Response, Router};
use chrono::Utc;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use sqlx::types::Json;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::audit::models::{AuditLog, NewAuditLog};
use crate::features::audit::AuditRepository;
use crate::features::auth::clients::{
    Credential, IdentityError, IdentityProvider, IdentitySession, IdentityUser, SignUpRequest,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::classification::models::ClassificationReply;
use crate::features::classification::{ClassificationError, ClassificationInput, DocumentClassifier};
use crate::features::files::dtos::FileListQuery;
use crate::features::files::models::{File, FileMetadata, NewFile};
use crate::features::files::FileRepository;
use crate::features::folders::models::{Folder, NewFolder};
use crate::features::folders::FolderRepository;
use crate::features::users::models::user::generate_foundarv_id;
use crate::features::users::models::{NewUser, User, UserType};
use crate::features::users::UserRepository;
use crate::features::whatsapp::clients::{MessagingError, OutboundMessage, WhatsAppMessenger};
use crate::features::whatsapp::models::{SessionData, WhatsAppSession};
use crate::features::whatsapp::SessionRepository;
use crate::modules::storage::{ObjectMetadata, ObjectStore, StorageError};

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-with-enough-bytes";

pub fn sample_user() -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        phone: Some("+6281200000000".to_string()),
        email: Some("founder@example.com".to_string()),
        foundarv_id: generate_foundarv_id(),
        user_type: UserType::Individual,
        created_at: now,
        updated_at: now,
    }
}

/// HS256 token shaped like a Supabase access token, valid for an hour
pub fn sign_test_token(user_id: Uuid, secret: &str) -> String {
    let claims = json!({
        "sub": user_id,
        "aud": "authenticated",
        "role": "authenticated",
        "exp": Utc::now().timestamp() + 3600,
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

static FILE_SEQ: AtomicI64 = AtomicI64::new(1_700_000_000_000);

/// Stored PDF owned by `owner`
pub fn sample_file(owner: Uuid, display_name: &str) -> File {
    let seq = FILE_SEQ.fetch_add(1, Ordering::SeqCst);
    let now = Utc::now();
    File {
        id: Uuid::now_v7(),
        user_id: owner,
        folder_id: None,
        original_name: format!("{}.pdf", display_name),
        display_name: display_name.to_string(),
        file_type: "Document".to_string(),
        file_size: 1024,
        mime_type: "application/pdf".to_string(),
        storage_path: format!("users/{}/files/{}-abcd1234.pdf", owner, seq),
        encrypted_key: "0".repeat(64),
        ai_generated_name: true,
        tags: vec!["document".to_string()],
        metadata: Json(FileMetadata {
            content_hash: "abcd1234".repeat(8),
            confidence: 0.9,
            original_size: 1024,
            processed_size: 1024,
            uploaded_at: now,
            ..Default::default()
        }),
        created_at: now,
        updated_at: now,
    }
}

/// Solid-colour PNG of the given size
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([40, 90, 160]));
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .unwrap();
    out
}

/// Wrap `router` so every request carries `user` as the authenticated principal
pub fn with_authenticated_user(router: Router, user: User) -> Router {
    let principal = AuthenticatedUser::from_user(user, "test-token".to_string());
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let principal = principal.clone();
            async move {
                request.extensions_mut().insert(principal);
                let response: Response = next.run(request).await;
                response
            }
        },
    ))
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: Mutex::new(users),
        }
    }

    pub fn all(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.all().into_iter().find(|u| u.id == id))
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>> {
        Ok(self
            .all()
            .into_iter()
            .find(|u| u.phone.as_deref() == Some(phone)))
    }

    async fn create(&self, new_user: NewUser) -> Result<User> {
        let now = Utc::now();
        let user = User {
            id: new_user.id,
            phone: new_user.phone,
            email: new_user.email,
            foundarv_id: new_user.foundarv_id,
            user_type: new_user.user_type,
            created_at: now,
            updated_at: now,
        };
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }
}

#[derive(Default)]
pub struct InMemoryAuditRepository {
    entries: Mutex<Vec<AuditLog>>,
    failing: bool,
}

impl InMemoryAuditRepository {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub fn entries(&self) -> Vec<AuditLog> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditRepository for InMemoryAuditRepository {
    async fn append(&self, entry: NewAuditLog) -> Result<AuditLog> {
        if self.failing {
            return Err(AppError::Internal("audit store offline".to_string()));
        }
        let log = AuditLog {
            id: Uuid::now_v7(),
            user_id: Some(entry.user_id),
            action: entry.action.as_str().to_string(),
            resource_type: entry.resource_type.as_str().to_string(),
            resource_id: entry.resource_id,
            details: Some(entry.details),
            ip_address: entry.ip_address,
            user_agent: entry.user_agent,
            created_at: Utc::now(),
        };
        self.entries.lock().unwrap().push(log.clone());
        Ok(log)
    }
}

#[derive(Default)]
pub struct InMemoryFolderRepository {
    folders: Mutex<Vec<Folder>>,
}

impl InMemoryFolderRepository {
    pub fn all(&self) -> Vec<Folder> {
        self.folders.lock().unwrap().clone()
    }

    pub fn insert(&self, new_folder: NewFolder) -> Folder {
        let now = Utc::now();
        let folder = Folder {
            id: Uuid::now_v7(),
            user_id: new_folder.user_id,
            name: new_folder.name,
            parent_id: new_folder.parent_id,
            folder_type: new_folder.folder_type,
            created_at: now,
            updated_at: now,
        };
        self.folders.lock().unwrap().push(folder.clone());
        folder
    }
}

#[async_trait]
impl FolderRepository for InMemoryFolderRepository {
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Folder>> {
        Ok(self
            .all()
            .into_iter()
            .filter(|f| f.user_id == user_id)
            .collect())
    }

    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<Folder>> {
        Ok(self
            .all()
            .into_iter()
            .find(|f| f.id == id && f.user_id == user_id))
    }

    async fn create(&self, new_folder: NewFolder) -> Result<Folder> {
        Ok(self.insert(new_folder))
    }
}

#[derive(Default)]
pub struct InMemoryFileRepository {
    files: Mutex<Vec<File>>,
    fail_inserts: Mutex<bool>,
}

impl InMemoryFileRepository {
    pub fn with_files(files: Vec<File>) -> Self {
        Self {
            files: Mutex::new(files),
            ..Default::default()
        }
    }

    pub fn push(&self, file: File) {
        self.files.lock().unwrap().push(file);
    }

    pub fn list_all(&self) -> Vec<File> {
        self.files.lock().unwrap().clone()
    }

    /// Make every later `create` fail
    pub fn fail_inserts(&self) {
        *self.fail_inserts.lock().unwrap() = true;
    }

    /// Owned files, newest first. Pushed files share timestamps closely, so
    /// insertion order breaks ties.
    fn owned_newest_first(&self, user_id: Uuid) -> Vec<File> {
        let mut owned: Vec<(usize, File)> = self
            .list_all()
            .into_iter()
            .enumerate()
            .filter(|(_, f)| f.user_id == user_id)
            .collect();
        owned.sort_by(|(ia, a), (ib, b)| b.created_at.cmp(&a.created_at).then(ib.cmp(ia)));
        owned.into_iter().map(|(_, f)| f).collect()
    }
}

fn matches_search(file: &File, search: &str) -> bool {
    let needle = search.to_lowercase();
    file.display_name.to_lowercase().contains(&needle)
        || file.tags.iter().any(|t| t.to_lowercase() == needle)
}

#[async_trait]
impl FileRepository for InMemoryFileRepository {
    async fn list(&self, user_id: Uuid, query: &FileListQuery) -> Result<Vec<File>> {
        Ok(self
            .owned_newest_first(user_id)
            .into_iter()
            .filter(|f| query.folder_id.is_none() || f.folder_id == query.folder_id)
            .filter(|f| query.search.as_deref().map_or(true, |s| matches_search(f, s)))
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .collect())
    }

    async fn count_by_user(&self, user_id: Uuid) -> Result<i64> {
        Ok(self.owned_newest_first(user_id).len() as i64)
    }

    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<File>> {
        Ok(self
            .list_all()
            .into_iter()
            .find(|f| f.id == id && f.user_id == user_id))
    }

    async fn find_latest_by_name(&self, user_id: Uuid, name: &str) -> Result<Option<File>> {
        let needle = name.to_lowercase();
        Ok(self
            .owned_newest_first(user_id)
            .into_iter()
            .find(|f| f.display_name.to_lowercase().contains(&needle)))
    }

    async fn delete_owned(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let mut files = self.files.lock().unwrap();
        let before = files.len();
        files.retain(|f| !(f.id == id && f.user_id == user_id));
        Ok(files.len() < before)
    }

    async fn create(&self, new_file: NewFile) -> Result<File> {
        if *self.fail_inserts.lock().unwrap() {
            return Err(AppError::Internal("files table unavailable".to_string()));
        }
        let now = Utc::now();
        let file = File {
            id: Uuid::now_v7(),
            user_id: new_file.user_id,
            folder_id: new_file.folder_id,
            original_name: new_file.original_name,
            display_name: new_file.display_name,
            file_type: new_file.file_type,
            file_size: new_file.file_size,
            mime_type: new_file.mime_type,
            storage_path: new_file.storage_path,
            encrypted_key: new_file.encrypted_key,
            ai_generated_name: new_file.ai_generated_name,
            tags: new_file.tags,
            metadata: Json(new_file.metadata),
            created_at: now,
            updated_at: now,
        };
        self.push(file.clone());
        Ok(file)
    }
}

#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: Mutex<HashMap<String, (Vec<u8>, ObjectMetadata)>>,
    failing: bool,
}

impl InMemoryObjectStore {
    /// Store whose every operation fails
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub fn insert(&self, key: &str, data: &[u8], metadata: ObjectMetadata) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (data.to_vec(), metadata));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn metadata(&self, key: &str) -> Option<ObjectMetadata> {
        self.objects.lock().unwrap().get(key).map(|(_, m)| m.clone())
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    fn unreachable(&self, key: &str) -> Option<String> {
        self.failing.then(|| format!("bucket unreachable for {}", key))
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        _content_type: &str,
        metadata: &ObjectMetadata,
    ) -> std::result::Result<(), StorageError> {
        if let Some(reason) = self.unreachable(key) {
            return Err(StorageError::Upload {
                key: key.to_string(),
                reason,
            });
        }
        self.insert(key, &data, metadata.clone());
        Ok(())
    }

    async fn get(&self, key: &str) -> std::result::Result<Vec<u8>, StorageError> {
        if let Some(reason) = self.unreachable(key) {
            return Err(StorageError::Download {
                key: key.to_string(),
                reason,
            });
        }
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(data, _)| data.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> std::result::Result<(), StorageError> {
        if let Some(reason) = self.unreachable(key) {
            return Err(StorageError::Delete {
                key: key.to_string(),
                reason,
            });
        }
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn presign_get(&self, key: &str, expires_in_secs: u32) -> std::result::Result<String, StorageError> {
        if let Some(reason) = self.unreachable(key) {
            return Err(StorageError::Presign {
                key: key.to_string(),
                reason,
            });
        }
        Ok(format!(
            "https://vault.test/{}?X-Amz-Expires={}",
            key, expires_in_secs
        ))
    }
}

pub struct FakeClassifier {
    reply: Option<ClassificationReply>,
}

impl FakeClassifier {
    /// Classifier whose every call errors
    pub fn failing() -> Self {
        Self { reply: None }
    }

    pub fn replying(reply: ClassificationReply) -> Self {
        Self { reply: Some(reply) }
    }
}

#[async_trait]
impl DocumentClassifier for FakeClassifier {
    async fn classify(
        &self,
        _input: &ClassificationInput<'_>,
    ) -> std::result::Result<ClassificationReply, ClassificationError> {
        self.reply.clone().ok_or(ClassificationError::EmptyReply)
    }
}

/// Identity provider that accepts every sign-up and, unless built with
/// `with_password`, every sign-in.
#[derive(Default)]
pub struct FakeIdentityProvider {
    password: Option<String>,
    reject_phone_sign_up: bool,
    sign_up_calls: AtomicUsize,
    sign_out_calls: AtomicUsize,
}

impl FakeIdentityProvider {
    pub fn with_password(password: &str) -> Self {
        Self {
            password: Some(password.to_string()),
            ..Default::default()
        }
    }

    pub fn rejecting_phone_sign_up() -> Self {
        Self {
            reject_phone_sign_up: true,
            ..Default::default()
        }
    }

    pub fn sign_up_calls(&self) -> usize {
        self.sign_up_calls.load(Ordering::SeqCst)
    }

    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }
}

fn identity_user(phone: Option<String>, email: Option<String>) -> IdentityUser {
    IdentityUser {
        id: Uuid::new_v4(),
        email,
        phone,
        created_at: Some(Utc::now()),
        user_metadata: json!({}),
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn sign_up(&self, request: &SignUpRequest) -> std::result::Result<IdentityUser, IdentityError> {
        self.sign_up_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_phone_sign_up && matches!(request.credential, Credential::Phone(_)) {
            return Err(IdentityError::Rejected("Phone signups are disabled".to_string()));
        }
        Ok(identity_user(
            Some(request.phone.clone()),
            Some(request.email.clone()),
        ))
    }

    async fn sign_in(
        &self,
        credential: &Credential,
        password: &str,
    ) -> std::result::Result<IdentitySession, IdentityError> {
        if self.password.as_deref().is_some_and(|p| p != password) {
            return Err(IdentityError::Rejected("Invalid login credentials".to_string()));
        }
        let user = match credential {
            Credential::Phone(phone) => identity_user(Some(phone.clone()), None),
            Credential::Email(email) => identity_user(None, Some(email.clone())),
        };
        Ok(IdentitySession {
            access_token: "access-token".to_string(),
            token_type: "bearer".to_string(),
            expires_in: 3600,
            expires_at: Some(Utc::now().timestamp() + 3600),
            refresh_token: "refresh-token".to_string(),
            user,
        })
    }

    async fn sign_out(&self, _access_token: &str) -> std::result::Result<(), IdentityError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn send_password_reset(&self, _email: &str) -> std::result::Result<(), IdentityError> {
        Ok(())
    }
}

/// Records outbound messages and media lookups
#[derive(Default)]
pub struct FakeMessenger {
    sent: Mutex<Vec<(String, OutboundMessage)>>,
    media_lookups: Mutex<Vec<String>>,
}

impl FakeMessenger {
    pub fn sent(&self) -> Vec<(String, OutboundMessage)> {
        self.sent.lock().unwrap().clone()
    }

    /// Bodies of text messages sent to `phone`, in order
    pub fn texts_to(&self, phone: &str) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(to, _)| to == phone)
            .filter_map(|(_, message)| match message {
                OutboundMessage::Text { text } => Some(text.body),
                _ => None,
            })
            .collect()
    }

    /// Media ids the bot resolved for download
    pub fn downloads(&self) -> Vec<String> {
        self.media_lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl WhatsAppMessenger for FakeMessenger {
    async fn send(
        &self,
        to: &str,
        message: &OutboundMessage,
    ) -> std::result::Result<Option<String>, MessagingError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push((to.to_string(), message.clone()));
        Ok(Some(format!("wamid.out.{}", sent.len())))
    }

    async fn media_url(&self, media_id: &str) -> std::result::Result<String, MessagingError> {
        self.media_lookups.lock().unwrap().push(media_id.to_string());
        Ok(format!("https://media.test/{}", media_id))
    }

    async fn download_media(&self, _url: &str) -> std::result::Result<Vec<u8>, MessagingError> {
        Ok(png_bytes(8, 8))
    }
}

#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: Mutex<Vec<WhatsAppSession>>,
}

impl InMemorySessionRepository {
    pub fn get(&self, phone_number: &str) -> Option<WhatsAppSession> {
        self.sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.phone_number == phone_number)
            .cloned()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<WhatsAppSession>> {
        Ok(self.get(phone_number))
    }

    async fn create(&self, phone_number: &str, user_id: Uuid) -> Result<WhatsAppSession> {
        if let Some(existing) = self.get(phone_number) {
            return Ok(existing);
        }
        let now = Utc::now();
        let session = WhatsAppSession {
            id: Uuid::now_v7(),
            phone_number: phone_number.to_string(),
            user_id,
            session_data: Json(SessionData::default()),
            created_at: now,
            updated_at: now,
        };
        self.sessions.lock().unwrap().push(session.clone());
        Ok(session)
    }

    async fn update_data(&self, id: Uuid, data: &SessionData) -> Result<()> {
        let mut sessions = self.sessions.lock().unwrap();
        if let Some(session) = sessions.iter_mut().find(|s| s.id == id) {
            session.session_data = Json(data.clone());
            session.updated_at = Utc::now();
        }
        Ok(())
    }
}
