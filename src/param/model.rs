use crate::foundation::error::{DarkroomError, DarkroomResult};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A parameter's current value.
///
/// Values are plain data with no widget coupling: the same value is stored
/// identically whether it came from a script, a test, or an interactive
/// control.
pub enum ParamValue {
    /// Signed integer value.
    Int(i64),
    /// Finite floating point value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// Index into a [`ParamSpec::Choice`] list.
    Choice(usize),
    /// Integer array value (kernel rows, anchor points, ...).
    IntArray(Vec<i64>),
}

impl ParamValue {
    fn kind_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Choice(_) => "choice",
            Self::IntArray(_) => "int array",
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Declared type, bounds and default of a parameter.
///
/// Out-of-range assignments are rejected, never clamped, for every kind; a
/// host that wants slider-style clamping clamps before calling
/// [`Param::set`]. `step` fields are hints for incrementing controls and are
/// not enforced as an alignment constraint.
pub enum ParamSpec {
    /// Bounded integer (`min..=max`).
    Int {
        /// Default value.
        default: i64,
        /// Inclusive lower bound.
        min: i64,
        /// Inclusive upper bound.
        max: i64,
        /// Increment hint for driving controls.
        step: i64,
    },
    /// Bounded finite float (`min..=max`).
    Float {
        /// Default value.
        default: f64,
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
        /// Increment hint for driving controls.
        step: f64,
    },
    /// Boolean flag.
    Bool {
        /// Default value.
        default: bool,
    },
    /// One of a fixed list of named choices; the value is an index.
    Choice {
        /// Default choice index.
        default: usize,
        /// Choice labels, in order.
        choices: Vec<String>,
    },
    /// Integer array with element-wise bounds (`min..=max` per element).
    IntArray {
        /// Default array.
        default: Vec<i64>,
        /// Inclusive per-element lower bound.
        min: i64,
        /// Inclusive per-element upper bound.
        max: i64,
    },
}

impl ParamSpec {
    /// The declared default as a [`ParamValue`].
    pub fn default_value(&self) -> ParamValue {
        match self {
            Self::Int { default, .. } => ParamValue::Int(*default),
            Self::Float { default, .. } => ParamValue::Float(*default),
            Self::Bool { default } => ParamValue::Bool(*default),
            Self::Choice { default, .. } => ParamValue::Choice(*default),
            Self::IntArray { default, .. } => ParamValue::IntArray(default.clone()),
        }
    }

    fn validate_spec(&self, param: &str) -> DarkroomResult<()> {
        match self {
            Self::Int {
                default,
                min,
                max,
                step,
            } => {
                if min > max {
                    return Err(spec_err(param, "min must be <= max"));
                }
                if *step <= 0 {
                    return Err(spec_err(param, "step must be > 0"));
                }
                if default < min || default > max {
                    return Err(spec_err(param, "default out of bounds"));
                }
            }
            Self::Float {
                default,
                min,
                max,
                step,
            } => {
                if !min.is_finite() || !max.is_finite() || min > max {
                    return Err(spec_err(param, "bounds must be finite with min <= max"));
                }
                if !step.is_finite() || *step <= 0.0 {
                    return Err(spec_err(param, "step must be finite and > 0"));
                }
                if !default.is_finite() || default < min || default > max {
                    return Err(spec_err(param, "default out of bounds"));
                }
            }
            Self::Bool { .. } => {}
            Self::Choice { default, choices } => {
                if choices.is_empty() {
                    return Err(spec_err(param, "choices must be non-empty"));
                }
                if *default >= choices.len() {
                    return Err(spec_err(param, "default choice index out of range"));
                }
            }
            Self::IntArray { default, min, max } => {
                if min > max {
                    return Err(spec_err(param, "min must be <= max"));
                }
                if default.iter().any(|v| v < min || v > max) {
                    return Err(spec_err(param, "default element out of bounds"));
                }
            }
        }
        Ok(())
    }

    fn validate_value(&self, param: &str, value: &ParamValue) -> DarkroomResult<()> {
        match (self, value) {
            (Self::Int { min, max, .. }, ParamValue::Int(v)) => {
                if v < min || v > max {
                    return Err(DarkroomError::invalid_param(
                        param,
                        format!("{v} outside [{min}, {max}]"),
                    ));
                }
            }
            (Self::Float { min, max, .. }, ParamValue::Float(v)) => {
                if !v.is_finite() {
                    return Err(DarkroomError::invalid_param(param, "must be finite"));
                }
                if v < min || v > max {
                    return Err(DarkroomError::invalid_param(
                        param,
                        format!("{v} outside [{min}, {max}]"),
                    ));
                }
            }
            (Self::Bool { .. }, ParamValue::Bool(_)) => {}
            (Self::Choice { choices, .. }, ParamValue::Choice(idx)) => {
                if *idx >= choices.len() {
                    return Err(DarkroomError::invalid_param(
                        param,
                        format!("choice index {idx} outside 0..{}", choices.len()),
                    ));
                }
            }
            (Self::IntArray { min, max, .. }, ParamValue::IntArray(vs)) => {
                if let Some(v) = vs.iter().find(|v| *v < min || *v > max) {
                    return Err(DarkroomError::invalid_param(
                        param,
                        format!("element {v} outside [{min}, {max}]"),
                    ));
                }
            }
            (_, got) => {
                return Err(DarkroomError::invalid_param(
                    param,
                    format!(
                        "expected {} value, got {}",
                        self.default_value().kind_name(),
                        got.kind_name()
                    ),
                ));
            }
        }
        Ok(())
    }
}

fn spec_err(param: &str, msg: &str) -> DarkroomError {
    DarkroomError::validation(format!("parameter '{param}' spec: {msg}"))
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawParam")]
/// A typed, named, bounded piece of transform state.
///
/// Invariant: the current value always satisfies the declared spec. The
/// setter is atomic; a rejected assignment leaves the previous value in
/// place. Deserialization goes through the same checks, so a restored
/// snapshot cannot carry an out-of-range value either.
pub struct Param {
    name: String,
    spec: ParamSpec,
    value: ParamValue,
}

impl Param {
    /// Create a parameter at its default value. Fails on a malformed spec
    /// (inverted bounds, empty choice list, out-of-range default).
    pub fn new(name: impl Into<String>, spec: ParamSpec) -> DarkroomResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DarkroomError::validation("parameter name must be non-empty"));
        }
        spec.validate_spec(&name)?;
        let value = spec.default_value();
        Ok(Self { name, spec, value })
    }

    /// Parameter name, unique within its owning transform.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared spec.
    pub fn spec(&self) -> &ParamSpec {
        &self.spec
    }

    /// Current value. No side effects.
    pub fn value(&self) -> &ParamValue {
        &self.value
    }

    /// Assign a new value.
    ///
    /// Returns whether the stored value differs from the previous one, so
    /// callers can skip dirty propagation on no-op writes. On an invalid
    /// value the parameter is left unchanged.
    pub fn set(&mut self, value: ParamValue) -> DarkroomResult<bool> {
        self.spec.validate_value(&self.name, &value)?;
        if self.value == value {
            return Ok(false);
        }
        tracing::debug!(param = %self.name, ?value, "store parameter value");
        self.value = value;
        Ok(true)
    }

    /// Restore the default value.
    ///
    /// Returns `true` only if the value actually changed; resetting an
    /// already-default parameter reports `false` and must not trigger a
    /// recompute.
    pub fn reset(&mut self) -> bool {
        let default = self.spec.default_value();
        if self.value == default {
            return false;
        }
        tracing::debug!(param = %self.name, "reset parameter to default");
        self.value = default;
        true
    }
}

/// Wire shape of [`Param`]; conversion re-runs the constructor and setter
/// validation.
#[derive(serde::Deserialize)]
struct RawParam {
    name: String,
    spec: ParamSpec,
    value: ParamValue,
}

impl TryFrom<RawParam> for Param {
    type Error = DarkroomError;

    fn try_from(raw: RawParam) -> DarkroomResult<Self> {
        let mut param = Param::new(raw.name, raw.spec)?;
        param.set(raw.value)?;
        Ok(param)
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawParamSet")]
/// Insertion-ordered parameter collection owned by one transform.
pub struct ParamSet {
    params: Vec<Param>,
}

#[derive(serde::Deserialize)]
struct RawParamSet {
    params: Vec<Param>,
}

impl TryFrom<RawParamSet> for ParamSet {
    type Error = DarkroomError;

    fn try_from(raw: RawParamSet) -> DarkroomResult<Self> {
        Self::new(raw.params)
    }
}

impl ParamSet {
    /// Build a set from declared parameters. Fails on duplicate names.
    pub fn new(params: Vec<Param>) -> DarkroomResult<Self> {
        for (i, p) in params.iter().enumerate() {
            if params[..i].iter().any(|q| q.name() == p.name()) {
                return Err(DarkroomError::validation(format!(
                    "duplicate parameter name '{}'",
                    p.name()
                )));
            }
        }
        Ok(Self { params })
    }

    /// An empty set, for transforms without tunable state.
    pub fn empty() -> Self {
        Self { params: Vec::new() }
    }

    /// Look up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name() == name)
    }

    /// Iterate parameters in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.params.iter()
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether the set has no parameters.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Set a parameter by name; see [`Param::set`].
    pub fn set(&mut self, name: &str, value: ParamValue) -> DarkroomResult<bool> {
        self.get_mut(name)?.set(value)
    }

    /// Reset a parameter by name; see [`Param::reset`].
    pub fn reset(&mut self, name: &str) -> DarkroomResult<bool> {
        Ok(self.get_mut(name)?.reset())
    }

    fn get_mut(&mut self, name: &str) -> DarkroomResult<&mut Param> {
        self.params
            .iter_mut()
            .find(|p| p.name() == name)
            .ok_or_else(|| DarkroomError::invalid_param(name, "unknown parameter"))
    }

    fn value(&self, name: &str) -> DarkroomResult<&ParamValue> {
        self.get(name)
            .map(Param::value)
            .ok_or_else(|| DarkroomError::invalid_param(name, "unknown parameter"))
    }

    /// Current value of an int parameter.
    pub fn int(&self, name: &str) -> DarkroomResult<i64> {
        match self.value(name)? {
            ParamValue::Int(v) => Ok(*v),
            other => Err(type_err(name, "int", other)),
        }
    }

    /// Current value of a float parameter.
    pub fn float(&self, name: &str) -> DarkroomResult<f64> {
        match self.value(name)? {
            ParamValue::Float(v) => Ok(*v),
            other => Err(type_err(name, "float", other)),
        }
    }

    /// Current value of a bool parameter.
    pub fn bool(&self, name: &str) -> DarkroomResult<bool> {
        match self.value(name)? {
            ParamValue::Bool(v) => Ok(*v),
            other => Err(type_err(name, "bool", other)),
        }
    }

    /// Current index of a choice parameter.
    pub fn choice(&self, name: &str) -> DarkroomResult<usize> {
        match self.value(name)? {
            ParamValue::Choice(v) => Ok(*v),
            other => Err(type_err(name, "choice", other)),
        }
    }

    /// Current value of an int-array parameter.
    pub fn int_array(&self, name: &str) -> DarkroomResult<&[i64]> {
        match self.value(name)? {
            ParamValue::IntArray(v) => Ok(v),
            other => Err(type_err(name, "int array", other)),
        }
    }
}

fn type_err(name: &str, expected: &str, got: &ParamValue) -> DarkroomError {
    DarkroomError::invalid_param(name, format!("expected {expected}, is {}", got.kind_name()))
}

#[cfg(test)]
#[path = "../../tests/unit/param/model.rs"]
mod tests;
