//! Core domain entities
//!
//! Pure data structures with validation logic - no I/O or external dependencies.

mod article;
pub mod pagination;
pub mod result;
mod session;
mod user;
pub mod validation;

pub use article::{ArticlePage, ArticleSummary, Bookmark, Category, CategoryId, Tag, EXCERPT_CHARS};
pub use pagination::PageWindow;
pub use session::{AuthResponse, PasswordResetTicket, Session, SessionSnapshot};
pub use user::{Identity, IdentityPatch, Role};
pub use validation::{
    ArticleDraft, LoginForm, PasswordChangeForm, PasswordResetForm, ProfileForm, RegistrationForm,
};
