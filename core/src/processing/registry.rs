//! Static queries over a processor list, run once when a pipeline is
//! assembled.

use crate::prelude::{processor_name, ConfigError, ConfigResult, Extension, Processor};
use crate::signal::{SignalClass, Z_BINS};
use std::collections::BTreeSet;

/// Union of the extensions declared by `processors` and the `external` seed.
pub fn processor_extensions(
    processors: &[Box<dyn Processor>],
    external: Option<&BTreeSet<Extension>>,
) -> BTreeSet<Extension> {
    let mut extensions = external.cloned().unwrap_or_default();
    for processor in processors {
        extensions.extend(processor.capabilities().extensions);
    }
    extensions
}

/// Union of the bunch statistics required by bunch-aware processors, merged
/// with the `required` seed. `z_bins` is always available and never listed.
///
/// A processor declaring [`Extension::Bunch`] without a variable list is a
/// configuration error.
pub fn processor_variables(
    processors: &[Box<dyn Processor>],
    required: Option<&BTreeSet<String>>,
) -> ConfigResult<BTreeSet<String>> {
    let mut variables = required.cloned().unwrap_or_default();
    for (index, processor) in processors.iter().enumerate() {
        let capabilities = processor.capabilities();
        if !capabilities.declares(&Extension::Bunch) {
            continue;
        }
        let declared =
            capabilities
                .required_variables
                .ok_or_else(|| ConfigError::MissingRequiredVariables {
                    processor: processor_name(processor.as_ref(), index),
                })?;
        variables.extend(declared);
    }
    variables.remove(Z_BINS);
    Ok(variables)
}

/// Walks the declared signal classes and returns the class of the final
/// output, or the first stage that cannot accept what it would receive.
pub fn check_signal_classes(
    processors: &[Box<dyn Processor>],
    input: SignalClass,
) -> ConfigResult<SignalClass> {
    processors
        .iter()
        .enumerate()
        .try_fold(input, |incoming, (index, processor)| {
            let capabilities = processor.capabilities();
            let (accepted, _) = capabilities.signal_classes;
            if accepted.accepts(incoming) {
                Ok(capabilities.emitted_class(incoming))
            } else {
                Err(ConfigError::IncompatibleSignalClass {
                    index,
                    processor: processor_name(processor.as_ref(), index),
                    expected: accepted,
                    found: incoming,
                })
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::Capabilities;
    use crate::processing::testing::Declaring;
    use crate::processing::{Bypass, Upsampler};
    use crate::signal::N_MACROPARTICLES_PER_SLICE;

    fn declaring(extensions: &[Extension]) -> Box<dyn Processor> {
        let mut caps = Capabilities::default();
        for extension in extensions {
            caps = caps.with_extension(extension.clone());
        }
        if caps.declares(&Extension::Bunch) {
            caps = caps.with_required_variables([N_MACROPARTICLES_PER_SLICE]);
        }
        Box::new(Declaring::new(caps))
    }

    #[test]
    fn extensions_are_deduplicated_regardless_of_order() {
        let forward = vec![
            declaring(&[Extension::Bunch]),
            declaring(&[Extension::Debug]),
            declaring(&[Extension::Bunch]),
        ];
        let backward: Vec<_> = forward.iter().rev().cloned().collect();
        let expected = BTreeSet::from([Extension::Bunch, Extension::Debug]);

        assert_eq!(processor_extensions(&forward, None), expected);
        assert_eq!(processor_extensions(&backward, None), expected);
    }

    #[test]
    fn external_and_unknown_extensions_are_surfaced() {
        let processors = vec![declaring(&[Extension::from("phase_shift")])];
        let seed = BTreeSet::from([Extension::Combiner]);

        assert_eq!(
            processor_extensions(&processors, Some(&seed)),
            BTreeSet::from([
                Extension::Combiner,
                Extension::Custom("phase_shift".into())
            ])
        );
        assert!(processor_extensions(&[], None).is_empty());
    }

    #[test]
    fn variables_exclude_z_bins() {
        let processors: Vec<Box<dyn Processor>> = vec![Box::new(Declaring::new(
            Capabilities::default()
                .with_extension(Extension::Bunch)
                .with_required_variables([N_MACROPARTICLES_PER_SLICE, Z_BINS]),
        ))];

        assert_eq!(
            processor_variables(&processors, None).unwrap(),
            BTreeSet::from([N_MACROPARTICLES_PER_SLICE.to_string()])
        );
    }

    #[test]
    fn variables_of_non_bunch_processors_are_ignored() {
        let processors: Vec<Box<dyn Processor>> = vec![
            Box::new(Declaring::new(
                Capabilities::default().with_required_variables(["mean_x"]),
            )),
            declaring(&[Extension::Bunch]),
        ];
        let seed = BTreeSet::from(["mean_y".to_string()]);

        assert_eq!(
            processor_variables(&processors, Some(&seed)).unwrap(),
            BTreeSet::from([
                "mean_y".to_string(),
                N_MACROPARTICLES_PER_SLICE.to_string()
            ])
        );
    }

    #[test]
    fn bunch_processor_without_variables_is_rejected() {
        let processors: Vec<Box<dyn Processor>> = vec![
            Box::new(Bypass::new()),
            Box::new(Declaring::new(
                Capabilities::default().with_extension(Extension::Bunch),
            )),
        ];

        assert_eq!(
            processor_variables(&processors, None).unwrap_err(),
            ConfigError::MissingRequiredVariables {
                processor: "#1".into()
            }
        );
    }

    #[test]
    fn class_chain_is_checked_stage_by_stage() {
        let processors: Vec<Box<dyn Processor>> = vec![
            Box::new(Bypass::new()),
            Box::new(Upsampler::new(2).unwrap()),
        ];

        assert_eq!(
            check_signal_classes(&processors, SignalClass::Uniform).unwrap(),
            SignalClass::Uniform
        );
        assert!(matches!(
            check_signal_classes(&processors, SignalClass::Unstructured),
            Err(ConfigError::IncompatibleSignalClass { index: 1, .. })
        ));
    }

    #[test]
    fn reshaping_stages_downgrade_the_class() {
        let processors: Vec<Box<dyn Processor>> = vec![
            Box::new(Declaring::new(Capabilities::default())),
            Box::new(Upsampler::new(2).unwrap()),
        ];

        assert_eq!(
            check_signal_classes(&processors, SignalClass::Uniform).unwrap_err(),
            ConfigError::IncompatibleSignalClass {
                index: 1,
                processor: "Upsampler".into(),
                expected: SignalClass::Segmented,
                found: SignalClass::Unstructured,
            }
        );
        assert_eq!(
            check_signal_classes(&[], SignalClass::Segmented).unwrap(),
            SignalClass::Segmented
        );
    }
}
