//! Builds an investigation playbook in code and prints its document form.

use cacao_core::common::{ExternalReference, Variable};
use cacao_core::markings::{DataMarking, MarkingCommon, StatementMarking, TlpMarking};
use cacao_core::playbook::codec;
use cacao_core::workflow::{CommandBody, CommandData, WorkflowStep};
use cacao_core::Playbook;

fn main() -> anyhow::Result<()> {
    let mut p = Playbook::new();
    p.name = Some("Find Malware FuzzyPanda".to_string());
    p.description =
        Some("This playbook will look for FuzzyPanda on the network and in a SIEM".to_string());
    p.add_playbook_types("investigation");
    p.created_by = Some("identity--5abe695c-7bd5-4c31-8824-2528696cdbf1".to_string());
    p.valid_from = p.created.clone();
    p.valid_until = Some("2026-12-31T23:59:59.999Z".to_string());
    p.priority = Some(3);
    p.severity = Some(70);
    p.impact = Some(5);
    p.add_industry_sectors("aerospace, defense");
    p.add_labels("malware, fuzzypanda, apt");

    p.add_external_reference(ExternalReference {
        name: Some("ACME Security FuzzyPanda Report".to_string()),
        description: Some("ACME security review of FuzzyPanda 2021".to_string()),
        source: Some("ACME Security Company".to_string()),
        url: Some("https://www.example.com/info/fuzzypanda2021.html".to_string()),
        ..Default::default()
    });

    // Markings: a copyright statement plus TLP GREEN
    let statement = DataMarking::Statement(StatementMarking {
        common: MarkingCommon {
            id: Some(cacao_core::id::new_id("marking-statement")?),
            created_by: p.created_by.clone(),
            created: p.created.clone(),
            ..Default::default()
        },
        statement: Some("Copyright 2026 ACME Security Company".to_string()),
        ..Default::default()
    });
    let green = DataMarking::Tlp(TlpMarking::green());
    for marking in [statement, green] {
        if let Some(id) = marking.common().id.clone() {
            p.add_markings(&id);
        }
        p.add_marking_definition(marking)?;
    }

    let mut variable = Variable {
        name: Some("__data_exfil_site__".to_string()),
        object_type: Some("ipv4-addr".to_string()),
        description: Some("The IP address for the data exfiltration site".to_string()),
        value: Some("1.2.3.4".to_string()),
        ..Default::default()
    };
    p.add_variable(variable.clone())?;
    variable.name = Some("__siem_hits__".to_string());
    variable.object_type = Some("string".to_string());
    variable.description = Some("Matches found in the SIEM".to_string());
    variable.value = None;
    p.add_variable(variable)?;

    // Workflow: start -> lookup -> end
    let mut start = WorkflowStep::new_start();
    start.common_mut().name = Some("Start Playbook Example 1".to_string());
    let mut lookup = WorkflowStep::new_action();
    lookup.common_mut().name = Some("IP Lookup".to_string());
    lookup.common_mut().description = Some("Lookup the IP address in the SIEM".to_string());
    if let WorkflowStep::Action(action) = &mut lookup {
        action.commands.push(CommandData::Manual(CommandBody {
            command: Some("Look up IP __data_exfil_site__:value in SIEM".to_string()),
            ..Default::default()
        }));
    }
    let mut end = WorkflowStep::new_end();
    end.common_mut().name = Some("End Playbook Example 1".to_string());

    p.workflow_start = start.common().id.clone();
    start.common_mut().on_completion = lookup.common().id.clone();
    lookup.common_mut().on_completion = end.common().id.clone();

    p.add_workflow_step(start)?;
    p.add_workflow_step(lookup)?;
    p.add_workflow_step(end)?;

    println!("{}", codec::encode_to_string(&p)?);
    Ok(())
}
