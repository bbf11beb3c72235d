//! Service layer for business logic
//!
//! Each service is generic over the repository traits it needs and holds them behind `Arc`,
//! so one storage backend can back all of them at once.

pub mod breach;
pub mod mailer;
pub mod otp;
pub mod password_rating;
pub mod score;
pub mod session;
pub mod site_check;
pub mod user;

pub use breach::BreachService;
pub use otp::OtpService;
pub use password_rating::PasswordRatingService;
pub use score::{DEFAULT_SUBSCORE_TIMEOUT, ScoreCard, ScoreService};
pub use session::SessionService;
pub use site_check::SiteCheckService;
pub use user::UserService;

#[cfg(feature = "mailer")]
pub use mailer::MailerCodeDelivery;
