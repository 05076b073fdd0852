pub mod altitude;
pub mod estimator;
pub mod heading;
pub mod navigation;
pub mod speed;
pub mod target;

pub use altitude::{AltitudeController, AltitudeGains, AltitudeLaw, HoverModel};
pub use estimator::MotionEstimator;
pub use heading::{HeadingController, HeadingGains, HeadingLaw};
pub use navigation::{NavState, NavigationController, NavigationGains};
pub use speed::{SpeedController, SpeedGains, SpeedLaw};
pub use target::TargetHandle;
