//! actuator.rs
//! Pushes one frame's joint angles and gripper scale into the stage.
//! - all five targets are resolved first; an unresolved path skips the frame with no writes
//! - the writes themselves are not transactional; a fault mid-sequence leaves a partial
//!   pose that the next frame overwrites
//! - teardown resets the behavior prim's rotation

use crate::component_b::{
    mapper::{JointAngles, ScaleFactor},
    scene::{AttrValue, Stage},
};
use crate::error::SceneError;

pub const JOINT_TARGET_ATTR: &str = "drive:angular:physics:targetPosition";
pub const SCALE_ATTR: &str = "xformOp:scale";
pub const ROTATE_ATTR: &str = "xformOp:rotateXYZ";

pub const BASE_JOINT_PATH: &str = "/DigiTwin/Base_1/Revolute10";
pub const SHOULDER_JOINT_PATH: &str = "/DigiTwin/R1_1/Revolute11";
pub const ELBOW_JOINT_PATH: &str = "/DigiTwin/Link1_1/Revolute12";
pub const WRIST_JOINT_PATH: &str = "/DigiTwin/Link2_1/Revolute13";
pub const CYLINDER_PATH: &str = "/physicsScene/Cylinder";

/// The five prims driven every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneTargets {
    /// base, shoulder, elbow, wrist
    pub joints: [String; 4],
    pub cylinder: String,
}

impl Default for SceneTargets {
    fn default() -> Self {
        Self {
            joints: [
                BASE_JOINT_PATH.to_string(),
                SHOULDER_JOINT_PATH.to_string(),
                ELBOW_JOINT_PATH.to_string(),
                WRIST_JOINT_PATH.to_string(),
            ],
            cylinder: CYLINDER_PATH.to_string(),
        }
    }
}

impl SceneTargets {
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.joints
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.cylinder.as_str()))
    }

    /// First target the stage cannot resolve.
    pub fn first_missing<S: Stage>(&self, stage: &S) -> Option<&str> {
        self.paths().find(|path| !stage.resolve(path))
    }
}

/// Write one frame. Nothing is written when a target is missing.
pub fn apply<S: Stage>(
    stage: &mut S,
    targets: &SceneTargets,
    angles: &JointAngles,
    scale: ScaleFactor,
) -> Result<(), SceneError> {
    if let Some(missing) = targets.first_missing(&*stage) {
        return Err(SceneError::MissingPrim(missing.to_string()));
    }

    for (path, degrees) in targets.joints.iter().zip(angles.as_array()) {
        stage.set_attribute(path, JOINT_TARGET_ATTR, AttrValue::Float(degrees))?;
    }

    let s = scale.value() as f32;
    stage.set_attribute(&targets.cylinder, SCALE_ATTR, AttrValue::Vec3f([s, s, s]))?;
    Ok(())
}

/// Zero the behavior prim's rotation.
pub fn reset_pose<S: Stage>(stage: &mut S, prim_path: &str) -> Result<(), SceneError> {
    stage.set_attribute(prim_path, ROTATE_ATTR, AttrValue::Vec3d([0.0, 0.0, 0.0]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component_b::scene::InMemoryStage;

    fn rig_stage() -> InMemoryStage {
        InMemoryStage::with_prims(SceneTargets::default().paths().map(str::to_string))
    }

    fn angles() -> JointAngles {
        JointAngles { base: 10.0, shoulder: 20.0, elbow: 30.0, wrist: -40.0 }
    }

    #[test]
    fn writes_each_joint_and_uniform_scale() {
        let mut stage = rig_stage();
        let targets = SceneTargets::default();

        apply(&mut stage, &targets, &angles(), ScaleFactor(0.775)).unwrap();

        assert_eq!(stage.attribute(BASE_JOINT_PATH, JOINT_TARGET_ATTR), Some(AttrValue::Float(10.0)));
        assert_eq!(stage.attribute(SHOULDER_JOINT_PATH, JOINT_TARGET_ATTR), Some(AttrValue::Float(20.0)));
        assert_eq!(stage.attribute(ELBOW_JOINT_PATH, JOINT_TARGET_ATTR), Some(AttrValue::Float(30.0)));
        assert_eq!(stage.attribute(WRIST_JOINT_PATH, JOINT_TARGET_ATTR), Some(AttrValue::Float(-40.0)));
        assert_eq!(
            stage.attribute(CYLINDER_PATH, SCALE_ATTR),
            Some(AttrValue::Vec3f([0.775f32; 3]))
        );
        assert_eq!(stage.write_count(), 5);
    }

    #[test]
    fn missing_target_skips_every_write() {
        let mut stage = rig_stage();
        stage.remove_prim(CYLINDER_PATH);

        let err = apply(&mut stage, &SceneTargets::default(), &angles(), ScaleFactor(0.5)).unwrap_err();
        assert_eq!(err, SceneError::MissingPrim(CYLINDER_PATH.into()));
        assert_eq!(stage.write_count(), 0);
    }

    #[test]
    fn reset_pose_zeroes_rotation() {
        let mut stage = InMemoryStage::with_prims(["/DigiTwin"]);
        reset_pose(&mut stage, "/DigiTwin").unwrap();
        assert_eq!(
            stage.attribute("/DigiTwin", ROTATE_ATTR),
            Some(AttrValue::Vec3d([0.0; 3]))
        );
    }
}
