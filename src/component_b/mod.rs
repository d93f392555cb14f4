//component B: Actuation
//Maps decoded samples to joint angles + gripper scale and writes them into the host stage
pub mod mapper;
pub mod scene;
pub mod actuator;
