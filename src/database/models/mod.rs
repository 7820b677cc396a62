pub mod analytics;
pub mod business_card;
pub mod contact;
pub mod email;
pub mod event;
pub mod lead_group;
pub mod organization;
pub mod user;

pub use analytics::{ActivityLog, DailyStats};
pub use business_card::{BusinessCard, CardStatus};
pub use contact::{Contact, ContactWithEvent};
pub use email::{EmailDraft, EmailDraftWithDetails, EmailStatus, EmailTemplate, GmailConnection};
pub use event::Event;
pub use lead_group::{LeadGroup, LeadGroupWithContacts};
pub use organization::Organization;
pub use user::User;
