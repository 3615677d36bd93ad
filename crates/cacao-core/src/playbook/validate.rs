//! Field-level playbook validation.
//!
//! Checks run in a fixed order and are independent: one failed field never
//! stops the rest. Each problem appends one `"--"` record to the trace;
//! passed checks append a `"++"` record only when the caller asked for them.

use crate::id;
use crate::playbook::Playbook;
use crate::timestamp;
use crate::vocab;

/// Trace recorder for one validation run.
struct Trace {
    include_passing_checks: bool,
    problems: usize,
    records: Vec<String>,
}

impl Trace {
    fn new(include_passing_checks: bool) -> Self {
        Trace { include_passing_checks, problems: 0, records: Vec::new() }
    }

    /// Records one check: `fail` on a problem, `pass` when requested.
    fn check(&mut self, ok: bool, fail: &str, pass: &str) {
        if ok {
            if self.include_passing_checks {
                self.records.push(format!("++ {pass}"));
            }
        } else {
            self.problems += 1;
            self.records.push(format!("-- {fail}"));
        }
    }

    fn required(&mut self, present: bool, property: &str) -> bool {
        self.check(
            present,
            &format!("the {property} property is required but missing"),
            &format!("the {property} property is required and is present"),
        );
        present
    }

    fn range(&mut self, property: &str, value: Option<i32>) {
        match value {
            Some(v) if v < 0 => self.check(
                false,
                &format!("the {property} property does not contain a valid value, it is less than zero"),
                "",
            ),
            Some(v) if v > 100 => self.check(
                false,
                &format!("the {property} property does not contain a valid value, it is greater than 100"),
                "",
            ),
            _ => self.check(true, "", &format!("the {property} property contains a valid value")),
        }
    }

    fn timestamp_format(&mut self, property: &str, value: Option<&str>) {
        if let Some(ts) = value {
            self.check(
                timestamp::is_valid(ts),
                &format!("the {property} property does not contain a valid timestamp"),
                &format!("the {property} property contains a valid timestamp"),
            );
        }
    }

    fn finish(self) -> (bool, usize, Vec<String>) {
        (self.problems == 0, self.problems, self.records)
    }
}

impl Playbook {
    /// Checks the playbook's top-level properties and returns whether it is
    /// valid, how many problems were found, and the per-check trace.
    ///
    /// Missing optional properties pass their checks; this never fails as an
    /// operation, a broken document simply produces a long trace.
    pub fn validate(&self, include_passing_checks: bool) -> (bool, usize, Vec<String>) {
        let mut trace = Trace::new(include_passing_checks);

        let object_type = self.object_type.as_deref().unwrap_or("");
        if trace.required(!object_type.is_empty(), "type") {
            trace.check(
                object_type == "playbook" || object_type == "playbook-template",
                "the type property does not contain a value of playbook or playbook-template",
                "the type property does contain a value of playbook or playbook-template",
            );
        }

        let spec_version = self.spec_version.as_deref().unwrap_or("");
        trace.required(!spec_version.is_empty(), "spec_version");

        let pb_id = self.id.as_deref().unwrap_or("");
        if trace.required(!pb_id.is_empty(), "id") {
            trace.check(
                id::is_valid(pb_id),
                "the id property does not contain a valid identifier",
                "the id property contains a valid identifier",
            );
        }

        let name = self.name.as_deref().unwrap_or("");
        trace.required(!name.is_empty(), "name");

        if trace.required(!self.playbook_types.is_empty(), "playbook_types") {
            for value in &self.playbook_types {
                trace.check(
                    vocab::is_playbook_type_valid(value),
                    &format!("the playbook_types property contains a value of \"{value}\" that is not in the vocabulary"),
                    &format!("the playbook_types property contains a value of \"{value}\" that is in the vocabulary"),
                );
            }
        }

        let created_by = self.created_by.as_deref().unwrap_or("");
        if trace.required(!created_by.is_empty(), "created_by") {
            trace.check(
                id::is_valid(created_by),
                "the created_by property does not contain a valid identifier",
                "the created_by property contains a valid identifier",
            );
        }

        let created = self.created.as_deref().unwrap_or("");
        if trace.required(!created.is_empty(), "created") {
            trace.timestamp_format("created", Some(created));
        }

        let modified = self.modified.as_deref().unwrap_or("");
        if trace.required(!modified.is_empty(), "modified") {
            trace.timestamp_format("modified", Some(modified));
            if let (Some(c), Some(m)) = (timestamp::parse(created), timestamp::parse(modified)) {
                trace.check(
                    m >= c,
                    "the modified timestamp is earlier than the created timestamp",
                    "the modified timestamp is not earlier than the created timestamp",
                );
            }
        }

        trace.timestamp_format("valid_from", self.valid_from.as_deref());
        trace.timestamp_format("valid_until", self.valid_until.as_deref());
        if let (Some(from), Some(until)) = (self.valid_from.as_deref(), self.valid_until.as_deref())
        {
            if let (Some(from), Some(until)) = (timestamp::parse(from), timestamp::parse(until)) {
                trace.check(
                    until > from,
                    "the valid_until timestamp is not later than the valid_from timestamp",
                    "the valid_until timestamp is later than the valid_from timestamp",
                );
            }
        }

        for value in &self.derived_from {
            trace.check(
                id::is_valid(value),
                &format!("the derived_from property contains a value of \"{value}\" that is not a valid identifier"),
                &format!("the derived_from property contains a value of \"{value}\" that is a valid identifier"),
            );
        }

        trace.range("priority", self.priority);
        trace.range("severity", self.severity);
        trace.range("impact", self.impact);

        for value in &self.industry_sectors {
            trace.check(
                vocab::is_industry_sector_valid(value),
                &format!("the industry_sectors property contains a value of \"{value}\" that is not in the vocabulary"),
                &format!("the industry_sectors property contains a value of \"{value}\" that is in the vocabulary"),
            );
        }

        for reference in &self.external_references {
            trace.check(
                reference.name.as_deref().is_some_and(|n| !n.is_empty()),
                "the name property in an external reference is required but missing",
                "the name property in an external reference is required and is present",
            );
        }

        trace.finish()
    }
}
