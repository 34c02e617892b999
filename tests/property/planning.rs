//! Property-based tests for include composition, deduplication and the
//! one-toolchain-process-per-file rule

use protobatch::job::{dedup_preserving_order, JobDescriptor, Target};
use protobatch::plan::{file_invocations, include_dirs};
use proptest::prelude::*;
use std::collections::HashSet;
use std::path::PathBuf;

fn segment() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

/// The file's directory always leads, followed by the include paths in order
#[test]
fn test_include_dirs_composition_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(
                proptest::collection::vec(segment(), 1..4),
                proptest::collection::vec(segment(), 0..5),
            ),
            |(dir_segments, includes)| {
                let dir: PathBuf = std::iter::once("/".to_string())
                    .chain(dir_segments)
                    .collect();
                let includes: Vec<PathBuf> =
                    includes.iter().map(|s| PathBuf::from("/inc").join(s)).collect();
                let file = dir.join("schema.proto");

                let dirs = include_dirs(&file, &includes);

                let mut expected = vec![dir.clone()];
                expected.extend(includes.iter().cloned());
                prop_assert_eq!(dirs, expected);
                Ok(())
            },
        )
        .unwrap();
}

/// Dedup keeps first occurrences in their original order and drops nothing else
#[test]
fn test_dedup_preserving_order_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&proptest::collection::vec(0u8..8, 0..20), |ids| {
            let paths: Vec<PathBuf> = ids
                .iter()
                .map(|i| PathBuf::from(format!("/p/{}.proto", i)))
                .collect();

            let deduped = dedup_preserving_order(paths.clone());

            let unique: HashSet<&PathBuf> = deduped.iter().collect();
            prop_assert_eq!(unique.len(), deduped.len());

            let mut seen = HashSet::new();
            let expected: Vec<PathBuf> = paths
                .iter()
                .filter(|p| seen.insert((*p).clone()))
                .cloned()
                .collect();
            prop_assert_eq!(deduped, expected);
            Ok(())
        })
        .unwrap();
}

/// At most one native and one toolchain invocation per file, native first
#[test]
fn test_invocations_per_file_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(any::<bool>(), any::<bool>(), any::<bool>()), |(java, python, grpc)| {
            let mut targets = Vec::new();
            if java {
                targets.push(Target::Java);
            }
            if python {
                targets.push(Target::Python);
            }
            if grpc {
                targets.push(Target::PythonGrpc);
            }
            prop_assume!(!targets.is_empty());

            let job = JobDescriptor::builder()
                .schema_file("/p/a.proto")
                .output_root("/out")
                .targets(targets)
                .build()
                .unwrap();
            let invocations = file_invocations(&job, job.schema_files()[0].as_path());

            let expected = usize::from(java) + usize::from(python || grpc);
            prop_assert_eq!(invocations.len(), expected);
            if java {
                prop_assert_eq!(invocations[0].target, Target::Java);
            }
            if grpc {
                prop_assert_eq!(invocations.last().unwrap().target, Target::PythonGrpc);
            }
            Ok(())
        })
        .unwrap();
}
