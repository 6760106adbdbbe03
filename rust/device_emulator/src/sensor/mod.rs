pub mod interface;
pub mod node;

pub use interface::{SensorContext, SensorCore, SensorFactory, SensorInterface, SensorTopics};
pub use node::SensorNode;
