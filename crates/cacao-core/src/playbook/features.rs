//! Capability summary derived from playbook content.

use serde::Serialize;

use crate::common::is_false;
use crate::playbook::Playbook;
use crate::workflow::WorkflowStep;

/// Which optional CACAO capabilities a playbook actually uses, so a
/// consumer can refuse documents it cannot execute without walking the
/// whole workflow.
///
/// Always derived from current content; a `features` object carried by a
/// decoded document is preserved verbatim but never consulted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Features {
    #[serde(skip_serializing_if = "is_false")]
    pub parallel_processing: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub if_logic: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub while_logic: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub switch_logic: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub temporal_logic: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub data_markings: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub extensions: bool,
}

impl Playbook {
    /// Computes the capability summary from the workflow, the markings in
    /// use and any extension properties.
    pub fn features(&self) -> Features {
        let mut features = Features::default();

        for step in self.workflow.values() {
            match step {
                WorkflowStep::Parallel(_) => features.parallel_processing = true,
                WorkflowStep::If(_) => features.if_logic = true,
                WorkflowStep::While(_) => features.while_logic = true,
                WorkflowStep::Switch(_) => features.switch_logic = true,
                _ => {}
            }
            let common = step.common();
            if common.delay.is_some_and(|ms| ms > 0) || common.timeout.is_some_and(|ms| ms > 0) {
                features.temporal_logic = true;
            }
            if !step.extra().is_empty() {
                features.extensions = true;
            }
            if let WorkflowStep::Action(action) = step {
                if action.commands.iter().any(|c| !c.body().extra.is_empty()) {
                    features.extensions = true;
                }
            }
        }

        if !self.markings.is_empty() || !self.data_marking_definitions.is_empty() {
            features.data_markings = true;
        }
        if self.data_marking_definitions.values().any(|m| !m.extra().is_empty()) {
            features.extensions = true;
        }
        // a stored features object sits in the extra bag and does not count
        if self.extra.keys().any(|key| key != "features") {
            features.extensions = true;
        }

        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markings::{DataMarking, TlpMarking};

    #[test]
    fn an_empty_playbook_advertises_nothing() {
        let pb = Playbook::new();
        assert_eq!(pb.features(), Features::default());

        let encoded = serde_json::to_string(&pb.features()).unwrap();
        assert_eq!(encoded, "{}");
    }

    #[test]
    fn branching_steps_light_up_their_flags() {
        let mut pb = Playbook::new();
        pb.add_workflow_step(WorkflowStep::new_parallel()).unwrap();
        pb.add_workflow_step(WorkflowStep::new_if()).unwrap();
        pb.add_workflow_step(WorkflowStep::new_switch()).unwrap();

        let features = pb.features();
        assert!(features.parallel_processing);
        assert!(features.if_logic);
        assert!(features.switch_logic);
        assert!(!features.while_logic);
        assert!(!features.temporal_logic);
    }

    #[test]
    fn positive_timers_imply_temporal_logic() {
        let mut pb = Playbook::new();
        let mut step = WorkflowStep::new_action();
        step.common_mut().delay = Some(0);
        pb.add_workflow_step(step).unwrap();
        assert!(!pb.features().temporal_logic);

        let mut step = WorkflowStep::new_action();
        step.common_mut().timeout = Some(30_000);
        pb.add_workflow_step(step).unwrap();
        assert!(pb.features().temporal_logic);
    }

    #[test]
    fn markings_count_whether_referenced_or_defined() {
        let mut pb = Playbook::new();
        pb.add_markings("marking-tlp--bab4a63c-aed9-4cf5-a766-dfca5abac2bb");
        assert!(pb.features().data_markings);

        let mut pb = Playbook::new();
        pb.add_marking_definition(DataMarking::Tlp(TlpMarking::amber())).unwrap();
        assert!(pb.features().data_markings);
    }

    #[test]
    fn extension_properties_are_detected_but_a_stored_features_key_is_not() {
        let mut pb = Playbook::new();
        pb.extra.insert("features".to_string(), serde_json::json!({"if_logic": true}));
        assert!(!pb.features().extensions);

        pb.extra.insert("x_acme_rollout".to_string(), serde_json::json!("canary"));
        assert!(pb.features().extensions);

        let mut pb = Playbook::new();
        let mut step = WorkflowStep::new_end();
        step.common_mut().name = Some("done".to_string());
        pb.add_workflow_step(step).unwrap();
        assert!(!pb.features().extensions);
    }

    #[test]
    fn only_set_flags_reach_the_wire() {
        let mut pb = Playbook::new();
        pb.add_workflow_step(WorkflowStep::new_while()).unwrap();

        let value = serde_json::to_value(pb.features()).unwrap();
        assert_eq!(value, serde_json::json!({"while_logic": true}));
    }
}
