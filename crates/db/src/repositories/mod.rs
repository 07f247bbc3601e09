pub mod alert_action_repo;
pub mod alert_repo;
pub mod gpu_metric_repo;
pub mod node_repo;
pub mod telemetry_topic_repo;

pub use alert_action_repo::AlertActionRepo;
pub use alert_repo::AlertRepo;
pub use gpu_metric_repo::GpuMetricRepo;
pub use node_repo::NodeRepo;
pub use telemetry_topic_repo::TelemetryTopicRepo;
