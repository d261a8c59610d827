use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::files::{dtos as files_dtos, handlers as files_handlers, models as files_models};
use crate::features::folders::{
    dtos as folders_dtos, handlers as folders_handlers, models as folders_models,
};
use crate::features::users::models as users_models;
use crate::features::whatsapp::{handlers as whatsapp_handlers, models as whatsapp_models};
use crate::shared::types::{ErrorResponse, SuccessResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::login,
        auth::handlers::signup,
        auth::handlers::reset_password,
        auth::handlers::logout,
        auth::handlers::get_me,
        // Files
        files_handlers::upload_file,
        files_handlers::list_files,
        files_handlers::get_download_url,
        files_handlers::download_file,
        files_handlers::delete_file,
        // Folders
        folders_handlers::list_folders,
        folders_handlers::create_folder,
        // WhatsApp
        whatsapp_handlers::verify_webhook,
        whatsapp_handlers::receive_webhook,
    ),
    components(
        schemas(
            // Shared
            ErrorResponse,
            SuccessResponse,
            // Users
            users_models::User,
            users_models::UserType,
            // Auth
            auth::model::AuthenticatedUser,
            auth::clients::IdentityUser,
            auth::clients::IdentitySession,
            auth::dtos::LoginRequestDto,
            auth::dtos::LoginResponseDto,
            auth::dtos::SignupRequestDto,
            auth::dtos::SignupResponseDto,
            auth::dtos::ResetPasswordRequestDto,
            auth::dtos::MeResponseDto,
            // Files
            files_models::File,
            files_models::FileMetadata,
            files_dtos::UploadFileDto,
            files_dtos::UploadedFileDto,
            files_dtos::UploadResponseDto,
            files_dtos::FileListResponseDto,
            files_dtos::DownloadUrlResponseDto,
            // Folders
            folders_models::Folder,
            folders_models::FolderType,
            folders_dtos::CreateFolderDto,
            folders_dtos::FolderListResponseDto,
            folders_dtos::CreateFolderResponseDto,
            // WhatsApp
            whatsapp_models::WebhookPayload,
            whatsapp_models::WebhookAckDto,
        )
    ),
    tags(
        (name = "auth", description = "Sign-up, login and session management"),
        (name = "files", description = "Document upload, listing and download"),
        (name = "folders", description = "User folder tree"),
        (name = "whatsapp", description = "WhatsApp Business webhook"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Foundarv Vault API",
        version = "0.1.0",
        description = "API documentation for the Foundarv document vault",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
