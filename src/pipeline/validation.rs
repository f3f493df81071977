//! Input port contract checks run before a handler sees its inputs.
//!
//! Each check logs the violation at `error!` and returns it; the executive
//! aborts the phase on the first failure.

use crate::data::{DataObject, FieldAssociation, FieldRequirement};
use crate::information::{keys, Information, InformationRef};
use crate::pipeline::error::{PipelineError, PipelineResult};

/// Collections searched when a requirement names no association.
const SEARCH_ORDER: [FieldAssociation; 6] = [
    FieldAssociation::Points,
    FieldAssociation::Cells,
    FieldAssociation::Vertices,
    FieldAssociation::Edges,
    FieldAssociation::Rows,
    FieldAssociation::Field,
];

/// Connection counts against the optional/repeatable declarations.
pub fn check_input_counts(
    node: &str,
    port_info: &[Information],
    connections: &[usize],
) -> PipelineResult<()> {
    for (port, (info, &count)) in port_info.iter().zip(connections).enumerate() {
        let optional = info.get_or(&keys::INPUT_IS_OPTIONAL, false);
        let repeatable = info.get_or(&keys::INPUT_IS_REPEATABLE, false);
        if !optional && count == 0 {
            tracing::error!(
                "Input port {} of '{}' requires a connection but has none",
                port,
                node
            );
            return Err(PipelineError::InputRequired {
                node: node.to_string(),
                port,
            });
        }
        if !repeatable && count > 1 {
            tracing::error!(
                "Input port {} of '{}' is not repeatable but has {} connections",
                port,
                node,
                count
            );
            return Err(PipelineError::InputNotRepeatable {
                node: node.to_string(),
                port,
                connections: count,
            });
        }
    }
    Ok(())
}

/// Every connected data object must be one of the port's required kinds.
pub fn check_input_types(
    node: &str,
    port_info: &[Information],
    inputs: &[Vec<InformationRef>],
) -> PipelineResult<()> {
    for (port, (info, connections)) in port_info.iter().zip(inputs).enumerate() {
        let Some(required) = info.required_kinds() else {
            continue;
        };
        if required.is_empty() {
            continue;
        }
        let optional = info.get_or(&keys::INPUT_IS_OPTIONAL, false);
        for (connection, input) in connections.iter().enumerate() {
            let data = input.borrow().data_object();
            let actual = match &data {
                Some(data) => {
                    let kind = data.borrow().kind();
                    if required.iter().any(|&r| kind.is_a(r)) {
                        continue;
                    }
                    kind.name().to_string()
                }
                None if optional => continue,
                None => "null".to_string(),
            };
            let expected = required
                .iter()
                .map(|k| k.name())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::error!(
                "Input {} on port {} of '{}' is {}, but one of [{}] is required",
                connection,
                port,
                node,
                actual,
                expected
            );
            return Err(PipelineError::InputType {
                node: node.to_string(),
                port,
                connection,
                expected,
                actual,
            });
        }
    }
    Ok(())
}

/// Every connected data object must carry an array matching each required
/// field. Composite inputs are left to the algorithm, which sees their leaves.
pub fn check_input_fields(
    node: &str,
    port_info: &[Information],
    inputs: &[Vec<InformationRef>],
) -> PipelineResult<()> {
    for (port, (info, connections)) in port_info.iter().zip(inputs).enumerate() {
        let Some(requirements) = info.required_fields() else {
            continue;
        };
        for (connection, input) in connections.iter().enumerate() {
            let data = input.borrow().data_object();
            let data = data.as_ref().map(|d| d.borrow());
            if data.as_ref().is_some_and(|d| d.kind().is_composite()) {
                continue;
            }
            for requirement in requirements {
                let found = data
                    .as_deref()
                    .is_some_and(|d| has_field(d, requirement));
                if found {
                    continue;
                }
                let association = requirement
                    .association
                    .map_or("all associations", FieldAssociation::name)
                    .to_string();
                tracing::error!(
                    "Required field not found on input {} of port {} of '{}': {}",
                    connection,
                    port,
                    node,
                    requirement
                );
                return Err(PipelineError::FieldNotFound {
                    node: node.to_string(),
                    port,
                    connection,
                    association,
                    requirement: requirement.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn has_field(data: &dyn DataObject, requirement: &FieldRequirement) -> bool {
    match requirement.association {
        Some(association) => data
            .attributes(association)
            .is_some_and(|fields| requirement.satisfied_by(fields)),
        None => SEARCH_ORDER.iter().any(|&association| {
            data.attributes(association)
                .is_some_and(|fields| requirement.satisfied_by(fields))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataArray, DataKind, DataSet};
    use crate::pipeline::port::InputPortSpec;

    fn port(spec: InputPortSpec) -> Vec<Information> {
        let mut info = Information::new();
        spec.fill(&mut info);
        vec![info]
    }

    fn connection(data: Option<DataSet>) -> InformationRef {
        let mut info = Information::new();
        if let Some(data) = data {
            info.set(&keys::DATA_OBJECT, data.into_ref());
        }
        info.into_ref()
    }

    #[test]
    fn test_counts() {
        let required = port(InputPortSpec::new("in"));
        assert_eq!(
            check_input_counts("n", &required, &[0]),
            Err(PipelineError::InputRequired {
                node: "n".into(),
                port: 0
            })
        );
        assert!(check_input_counts("n", &required, &[1]).is_ok());
        assert!(matches!(
            check_input_counts("n", &required, &[2]),
            Err(PipelineError::InputNotRepeatable { connections: 2, .. })
        ));

        let relaxed = port(InputPortSpec::new("in").optional().repeatable());
        assert!(check_input_counts("n", &relaxed, &[0]).is_ok());
        assert!(check_input_counts("n", &relaxed, &[5]).is_ok());
    }

    #[test]
    fn test_types_use_is_a() {
        let info = port(InputPortSpec::new("in").accepts(DataKind::PointSet));
        let poly = vec![vec![connection(Some(DataSet::new(DataKind::PolyData)))]];
        assert!(check_input_types("n", &info, &poly).is_ok());

        let image = vec![vec![connection(Some(DataSet::new(DataKind::ImageData)))]];
        let err = check_input_types("n", &info, &image).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InputType { ref actual, .. } if actual == "ImageData"
        ));
    }

    #[test]
    fn test_null_input_against_required_type() {
        let info = port(InputPortSpec::new("in").accepts(DataKind::DataSet));
        let null = vec![vec![connection(None)]];
        assert!(matches!(
            check_input_types("n", &info, &null),
            Err(PipelineError::InputType { ref actual, .. }) if actual == "null"
        ));

        let optional = port(InputPortSpec::new("in").accepts(DataKind::DataSet).optional());
        assert!(check_input_types("n", &optional, &null).is_ok());
    }

    #[test]
    fn test_fields_search_associations() {
        let mut ds = DataSet::new(DataKind::PolyData);
        ds.point_data_mut()
            .add_array(DataArray::scalars("Temp", vec![1.0, 2.0]));
        let inputs = vec![vec![connection(Some(ds))]];

        let anywhere = port(InputPortSpec::new("in").requires_field(FieldRequirement::named("Temp")));
        assert!(check_input_fields("n", &anywhere, &inputs).is_ok());

        let on_points = port(
            InputPortSpec::new("in")
                .requires_field(FieldRequirement::named("Temp").on(FieldAssociation::Points)),
        );
        assert!(check_input_fields("n", &on_points, &inputs).is_ok());

        let on_cells = port(
            InputPortSpec::new("in")
                .requires_field(FieldRequirement::named("Temp").on(FieldAssociation::Cells)),
        );
        let err = check_input_fields("n", &on_cells, &inputs).unwrap_err();
        match err {
            PipelineError::FieldNotFound {
                port,
                connection,
                association,
                ..
            } => {
                assert_eq!((port, connection), (0, 0));
                assert_eq!(association, "cells");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_fields_skip_composite_inputs() {
        let mut info = Information::new();
        info.set(
            &keys::DATA_OBJECT,
            crate::data::CompositeDataSet::multi_block().into_ref(),
        );
        let inputs = vec![vec![info.into_ref()]];
        let spec = port(InputPortSpec::new("in").requires_field(FieldRequirement::named("x")));
        assert!(check_input_fields("n", &spec, &inputs).is_ok());
    }
}
