mod reading;
mod record;
mod settings;

pub use reading::Reading;
pub use record::{TIME_FORMAT, WeighRecord};
pub use settings::PollSettings;
