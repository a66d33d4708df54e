pub mod card;
pub mod deck;
pub mod review;
pub mod user;

pub use card::{Card, CardCategory};
pub use deck::Deck;
pub use review::{Answer, ReviewSubmission};
pub use user::User;
