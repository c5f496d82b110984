pub use super::answers::Entity as Answers;
pub use super::questions::Entity as Questions;
pub use super::tags::Entity as Tags;
pub use super::tenants::Entity as Tenants;
