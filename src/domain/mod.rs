mod device;
mod subscriber_email;
mod subscriber_name;
mod subscriber_submission;

pub use device::DeviceClass;
pub use subscriber_email::SubscriberEmail;
pub use subscriber_name::SubscriberName;
pub use subscriber_submission::{SubscriberSubmission, UNKNOWN_USER_AGENT};
