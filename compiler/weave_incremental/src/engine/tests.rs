#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]

use std::collections::BTreeSet;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use weave_fingerprint::Fingerprinter;
use weave_ir::{FilePath, ProjectId, TypeName};

use super::{Classification, TransformationEngine};
use crate::config::DiffOptions;
use crate::diff::{diff, FileChangeKind, PartialTypeChangeKind};
use crate::error::ClassifierError;
use crate::version::{Compilation, ProjectVersion, SourceText, VersionBuilder};

#[test]
fn fingerprinter_classifies_files() {
    let engine = Fingerprinter::new();
    let path = FilePath::from("code.cs");
    let class = engine
        .classify_file(&path, "using Aspects; partial class C {}")
        .ok();
    let class = class.map(|c| (c.is_compile_time_code, c.partial_types));
    assert_eq!(
        class,
        Some((true, BTreeSet::from([TypeName::from("C")])))
    );
}

#[test]
fn membership_reported_by_classification_reaches_the_diff() {
    struct Fixed;

    impl TransformationEngine for Fixed {
        fn classify_file(
            &self,
            _path: &FilePath,
            content: &str,
        ) -> Result<Classification, ClassifierError> {
            // Membership deliberately disagrees with the text.
            let partial_types = if content.contains("two") {
                BTreeSet::from([TypeName::from("T"), TypeName::from("U")])
            } else {
                BTreeSet::from([TypeName::from("T")])
            };
            Ok(Classification {
                declaration_hash: 1,
                body_hash: 2,
                is_compile_time_code: false,
                partial_types,
            })
        }
    }

    fn no_refs(_: &ProjectId) -> Option<Arc<ProjectVersion>> {
        None
    }

    let builder = VersionBuilder::new(&Fixed);
    let snapshot = |text: &str| {
        Compilation::new(
            ProjectId::named("App"),
            vec![SourceText::new("a.cs", text.to_owned())],
            Vec::new(),
        )
    };
    let old = Arc::new(builder.build(None, &snapshot("one"), &mut no_refs).unwrap());
    let new = Arc::new(builder.build(Some(&*old), &snapshot("two"), &mut no_refs).unwrap());

    let changes = diff(Some(&old), &new, DiffOptions::default());
    let change = &changes.syntax_tree_changes[&FilePath::from("a.cs")];
    assert_eq!(change.kind, FileChangeKind::Changed);
    let events: Vec<_> = change
        .partial_type_changes
        .iter()
        .map(|event| (event.type_name.as_str(), event.kind))
        .collect();
    assert_eq!(events, vec![("U", PartialTypeChangeKind::Added)]);
}
