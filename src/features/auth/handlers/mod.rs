pub mod auth_handler;

pub use auth_handler::{
    __path_get_me, __path_login, __path_logout, __path_reset_password, __path_signup, get_me,
    login, logout, reset_password, signup,
};
