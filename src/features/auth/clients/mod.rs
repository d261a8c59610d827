mod identity_provider;
mod supabase_auth_client;

pub use identity_provider::{
    Credential, IdentityError, IdentityProvider, IdentitySession, IdentityUser, SignUpRequest,
};
pub use supabase_auth_client::SupabaseAuthClient;
