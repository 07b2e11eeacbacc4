//! Parameter classification.
//!
//! Converts an endpoint's raw parameters into normalized [`Parameter`]s.
//! Raw parameters are first split into runs: adjacent fragments of the same
//! compound argument form one run, as do adjacent entries describing the
//! same uploaded file. Each run then yields zero or more parameters:
//!
//! | Run                                  | Result                                |
//! |--------------------------------------|---------------------------------------|
//! | Single uploaded file                 | one `File` parameter typed `Stream`   |
//! | File collection                      | one `File` parameter, `List<Stream>`  |
//! | Raw form collection                  | one `Form` dictionary parameter       |
//! | Form model fragments without files   | one `Form` parameter of the model type|
//! | Query model fragments (opt-in)       | one `Query` parameter of the model    |
//! | Anything else                        | one parameter per raw entry           |
//!
//! A model run collapses from its first Form or Query fragment on; fragments
//! bound elsewhere ahead of it stay separate parameters.
//!
//! Cancellation tokens are skipped and, when configured, one is appended last.

use cg_core::naming::{strip_non_alphanumeric, to_camel_case};
use cg_core::{
    BindingSource, FxHashSet, GenerateOptions, Parameter, ParameterBinding, ParameterSource,
    RawEndpoint, RawParameter, TypeRef,
};
use smallvec::{SmallVec, smallvec};

use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::error::BuildError;
use crate::literal::{DEFAULT_LITERAL, NULL_LITERAL, default_literal};

/// Wire and local name of the appended cancellation token.
const CANCELLATION_TOKEN_NAME: &str = "cancellationToken";

type Classified = SmallVec<[Parameter; 1]>;

/// Classifies the parameters of one endpoint.
pub(crate) struct ParameterClassifier<'a> {
    endpoint: &'a RawEndpoint,
    options: &'a GenerateOptions,
}

impl<'a> ParameterClassifier<'a> {
    pub(crate) fn new(endpoint: &'a RawEndpoint, options: &'a GenerateOptions) -> Self {
        Self { endpoint, options }
    }

    /// Returns the normalized parameter list.
    ///
    /// Parameters whose wire name repeats an earlier one (case-insensitively)
    /// are dropped and reported.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnsupportedDefaultValue`] if a declared default
    /// has no literal form.
    pub(crate) fn classify(
        &self,
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<Parameter>, BuildError> {
        let raw: Vec<&RawParameter> = self
            .endpoint
            .parameters
            .iter()
            .filter(|parameter| !parameter.value_type.is_cancellation_token())
            .collect();

        let mut parameters = Vec::with_capacity(raw.len() + 1);
        let mut seen: FxHashSet<String> = FxHashSet::default();

        for run in raw.chunk_by(|a, b| same_run(a, b)) {
            for parameter in self.classify_run(run)? {
                if seen.insert(parameter.name.to_lowercase()) {
                    parameters.push(parameter);
                } else {
                    diagnostics.report(Diagnostic::DuplicateParameter {
                        endpoint: self.endpoint.label().into_owned(),
                        parameter: parameter.name,
                    });
                }
            }
        }

        if self.options.add_cancellation_token_parameters {
            parameters.push(Parameter {
                source: ParameterSource::Other,
                value_type: TypeRef::cancellation_token(),
                name: CANCELLATION_TOKEN_NAME.to_owned(),
                local_name: CANCELLATION_TOKEN_NAME.to_owned(),
                default_value_literal: Some(DEFAULT_LITERAL.to_owned()),
                constant: false,
            });
        }

        Ok(parameters)
    }

    fn classify_run(&self, run: &[&RawParameter]) -> Result<Classified, BuildError> {
        let Some(first) = run.first() else {
            return Ok(Classified::new());
        };

        match &first.binding {
            ParameterBinding::Scalar { .. } => self.classify_scalar(first),
            ParameterBinding::Fragment {
                owner_name,
                container_type,
            } => {
                let has_files = run.iter().any(|parameter| is_file(parameter));
                let collapse_at = run.iter().position(|parameter| {
                    (parameter.source == BindingSource::Form && !has_files)
                        || (parameter.source == BindingSource::Query && self.options.use_query_models)
                });

                // Fragments ahead of the first collapsible one stay separate.
                let (separate, rest) = run.split_at(collapse_at.unwrap_or(run.len()));
                let mut classified = separate
                    .iter()
                    .map(|parameter| self.classify_general(parameter))
                    .collect::<Result<Classified, _>>()?;

                if let Some(start) = rest.first() {
                    let source = if start.source == BindingSource::Form {
                        ParameterSource::Form
                    } else {
                        ParameterSource::Query
                    };
                    classified.push(collapsed(source, start, owner_name, container_type));
                }

                Ok(classified)
            }
        }
    }

    fn classify_scalar(&self, parameter: &RawParameter) -> Result<Classified, BuildError> {
        let ty = &parameter.value_type;
        let local_name = local_identifier(argument_name(parameter));

        let simple = |source, value_type, default_value_literal: Option<&str>| Parameter {
            source,
            value_type,
            name: parameter.name.clone(),
            local_name: local_name.clone(),
            default_value_literal: default_value_literal.map(str::to_owned),
            constant: false,
        };

        if ty.is_form_file() {
            return Ok(smallvec![simple(
                ParameterSource::File,
                TypeRef::stream(),
                None
            )]);
        }

        if ty.is_file_collection() {
            return Ok(smallvec![simple(
                ParameterSource::File,
                TypeRef::list_of(TypeRef::stream()),
                None,
            )]);
        }

        if parameter.source == BindingSource::Form {
            let classified = if ty.is_form_collection() {
                simple(ParameterSource::Form, TypeRef::string_map(), None)
            } else {
                simple(ParameterSource::Form, ty.clone(), Some(NULL_LITERAL))
            };
            return Ok(smallvec![classified]);
        }

        Ok(smallvec![self.classify_general(parameter)?])
    }

    fn classify_general(&self, parameter: &RawParameter) -> Result<Parameter, BuildError> {
        let source = match parameter.source {
            BindingSource::Path => ParameterSource::Path,
            BindingSource::Query | BindingSource::Other => ParameterSource::Query,
            BindingSource::Header => ParameterSource::Header,
            BindingSource::Body => ParameterSource::Body,
            BindingSource::Form => ParameterSource::Form,
            BindingSource::FormFile => ParameterSource::File,
        };

        // A fragment's argument name belongs to the whole model.
        let local_name = if parameter.binding.is_fragment() {
            local_identifier(&parameter.name)
        } else {
            local_identifier(argument_name(parameter))
        };

        let value_type = if parameter.source == BindingSource::FormFile {
            if parameter.value_type.is_file_collection() {
                TypeRef::list_of(TypeRef::stream())
            } else {
                TypeRef::stream()
            }
        } else {
            parameter.value_type.clone()
        };

        let default_value_literal =
            default_literal(&self.endpoint.label(), parameter, &value_type)?;

        let value_type = if default_value_literal.as_deref() == Some(NULL_LITERAL) {
            value_type.nullable()
        } else {
            value_type
        };

        Ok(Parameter {
            source,
            value_type,
            name: parameter.name.clone(),
            local_name,
            default_value_literal,
            constant: source == ParameterSource::Header && parameter.constant,
        })
    }
}

/// One parameter standing for a whole model.
///
/// The wire name is that of the fragment the collapse starts at, so a later
/// parameter repeating it is dropped as a duplicate.
fn collapsed(
    source: ParameterSource,
    start: &RawParameter,
    owner_name: &str,
    container_type: &TypeRef,
) -> Parameter {
    Parameter {
        source,
        value_type: container_type.clone(),
        name: start.name.clone(),
        local_name: local_identifier(owner_name),
        default_value_literal: Some(NULL_LITERAL.to_owned()),
        constant: false,
    }
}

/// Returns `true` if two adjacent raw parameters belong to one run.
fn same_run(a: &RawParameter, b: &RawParameter) -> bool {
    match (&a.binding, &b.binding) {
        (
            ParameterBinding::Fragment {
                owner_name: owner_a,
                container_type: container_a,
            },
            ParameterBinding::Fragment {
                owner_name: owner_b,
                container_type: container_b,
            },
        ) => owner_a == owner_b && container_a == container_b,
        (ParameterBinding::Scalar { .. }, ParameterBinding::Scalar { .. }) => {
            a.value_type.is_form_file()
                && a.value_type == b.value_type
                && argument_name(a) == argument_name(b)
        }
        _ => false,
    }
}

fn is_file(parameter: &RawParameter) -> bool {
    parameter.source == BindingSource::FormFile
        || parameter.value_type.is_form_file()
        || parameter.value_type.is_file_collection()
}

/// Handler argument name of a scalar, falling back to the wire name.
fn argument_name(parameter: &RawParameter) -> &str {
    match &parameter.binding {
        ParameterBinding::Scalar {
            argument_name: Some(name),
        } => name,
        ParameterBinding::Scalar {
            argument_name: None,
        }
        | ParameterBinding::Fragment { .. } => &parameter.name,
    }
}

fn local_identifier(name: &str) -> String {
    strip_non_alphanumeric(&to_camel_case(name))
}
