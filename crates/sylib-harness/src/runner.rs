//! Fixture execution engine.
//!
//! Each case drives one `sylib-core` runtime operation against in-memory
//! console streams and renders the result as text for comparison.

use serde::Deserialize;
use serde_json::Value;
use sylib_core::{FloatTextPolicy, FormatArg, Runtime};

use crate::diff;
use crate::error::HarnessError;
use crate::fixtures::{FixtureCase, FixtureSet};
use crate::verify::VerificationResult;

/// Runs a fixture set and collects verification results.
pub struct TestRunner {
    /// Name of the test campaign.
    pub campaign: String,
    /// Float text policy the runtime is driven with.
    pub policy: FloatTextPolicy,
}

impl TestRunner {
    #[must_use]
    pub fn new(campaign: impl Into<String>, policy: FloatTextPolicy) -> Self {
        Self {
            campaign: campaign.into(),
            policy,
        }
    }

    /// Run every case in `fixture_set` that applies to this runner's policy.
    pub fn run(&self, fixture_set: &FixtureSet) -> Vec<VerificationResult> {
        fixture_set
            .cases
            .iter()
            .filter(|case| policy_matches(self.policy, &case.policy))
            .map(|case| {
                let (actual, diff) = execute_case(case, self.policy);
                let case_name = if case.policy.eq_ignore_ascii_case("both") {
                    format!("{} [{}]", case.name, self.policy)
                } else {
                    case.name.clone()
                };
                VerificationResult {
                    case_name,
                    function: case.function.clone(),
                    policy: self.policy.to_string(),
                    passed: actual == case.expected_output,
                    expected: case.expected_output.clone(),
                    actual,
                    diff,
                }
            })
            .collect()
    }
}

fn policy_matches(active: FloatTextPolicy, case_policy: &str) -> bool {
    case_policy.eq_ignore_ascii_case("both") || case_policy.eq_ignore_ascii_case(active.as_str())
}

fn execute_case(case: &FixtureCase, policy: FloatTextPolicy) -> (String, Option<String>) {
    match execute_fixture_case(&case.function, &case.inputs, policy) {
        Ok(actual) => {
            let diff = (actual != case.expected_output)
                .then(|| diff::render_diff(&case.expected_output, &actual));
            (actual, diff)
        }
        Err(err) => {
            let actual = format!("unsupported:{err}");
            let diff = Some(diff::render_diff(&case.expected_output, &actual));
            (actual, diff)
        }
    }
}

/// One `putf` argument as written in fixture JSON, e.g. `{"int": -3}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum FixtureArg {
    Int(i64),
    Uint(u64),
    Float(f64),
    Char(char),
    Str(String),
    Ptr(usize),
}

impl FixtureArg {
    /// `None` for a `char` outside `U+0000..=U+00FF`, which has no single-byte form.
    fn as_format_arg(&self) -> Option<FormatArg<'_>> {
        Some(match self {
            Self::Int(v) => FormatArg::SignedInt(*v),
            Self::Uint(v) => FormatArg::UnsignedInt(*v),
            Self::Float(v) => FormatArg::Float(*v),
            Self::Char(c) => FormatArg::Char(u8::try_from(u32::from(*c)).ok()?),
            Self::Str(s) => FormatArg::Str(s.as_bytes()),
            Self::Ptr(p) => FormatArg::Pointer(*p),
        })
    }
}

/// Execute one runtime operation described by `function` and `inputs`.
///
/// Output operations return the console text they produce. Input operations
/// read from `inputs.stdin` and return the values read (Rust `Debug` form),
/// prefixed with `n=<count>` for array reads.
pub fn execute_fixture_case(
    function: &str,
    inputs: &Value,
    policy: FloatTextPolicy,
) -> Result<String, HarnessError> {
    let input = Inputs { function, inputs };
    let stdin = input.opt_str("stdin").unwrap_or_default();
    let mut rt = Runtime::with_policy(stdin.as_bytes(), Vec::new(), policy);

    let read_result = match function {
        "putint" => {
            for v in input.ints("values")? {
                rt.write_int(v);
            }
            None
        }
        "putch" => {
            for v in input.ints("values")? {
                rt.write_char(v);
            }
            None
        }
        "putfloat" => {
            for v in input.floats("values")? {
                rt.write_float(v);
            }
            None
        }
        "putarray" => {
            let values = input.ints("values")?;
            rt.write_int_array(input.count("n", values.len())?, &values);
            None
        }
        "putfarray" => {
            let values = input.floats("values")?;
            rt.write_float_array(input.count("n", values.len())?, &values);
            None
        }
        "putf" => {
            let template = input.str("format")?;
            let args: Vec<FixtureArg> = match inputs.get("args") {
                Some(raw) => serde_json::from_value(raw.clone())
                    .map_err(|e| input.bad(format!("args: {e}")))?,
                None => Vec::new(),
            };
            let args = args
                .iter()
                .map(|arg| {
                    arg.as_format_arg()
                        .ok_or_else(|| input.bad(format!("{arg:?} is not a single byte")))
                })
                .collect::<Result<Vec<_>, _>>()?;
            rt.write_formatted(template.as_bytes(), &args);
            None
        }
        "getint" => {
            let values: Vec<i32> = (0..input.reads()?).map(|_| rt.read_int()).collect();
            Some(format!("{values:?}"))
        }
        "getch" => {
            let values: Vec<i32> = (0..input.reads()?).map(|_| rt.read_char()).collect();
            Some(format!("{values:?}"))
        }
        "getfloat" => {
            let values: Vec<f32> = (0..input.reads()?).map(|_| rt.read_float()).collect();
            Some(format!("{values:?}"))
        }
        "getarray" => {
            let mut buffer = vec![0; input.count("capacity", 0)?.max(0) as usize];
            let n = rt.read_int_array(&mut buffer);
            Some(format!("n={n} {buffer:?}"))
        }
        "getfarray" => {
            let mut buffer = vec![0.0; input.count("capacity", 0)?.max(0) as usize];
            let n = rt.read_float_array(&mut buffer);
            Some(format!("n={n} {buffer:?}"))
        }
        "starttime" | "stoptime" => {
            rt.start_timer(None);
            rt.stop_timer(None);
            None
        }
        other => return Err(HarnessError::UnknownFunction(other.to_string())),
    };

    Ok(match read_result {
        Some(text) => text,
        None => String::from_utf8_lossy(&rt.into_output()).into_owned(),
    })
}

/// Typed accessors over a case's `inputs` object.
struct Inputs<'a> {
    function: &'a str,
    inputs: &'a Value,
}

impl Inputs<'_> {
    fn bad(&self, message: impl Into<String>) -> HarnessError {
        HarnessError::BadInput {
            function: self.function.to_string(),
            message: message.into(),
        }
    }

    fn opt_str(&self, key: &str) -> Option<String> {
        self.inputs.get(key).and_then(Value::as_str).map(str::to_string)
    }

    fn str(&self, key: &str) -> Result<String, HarnessError> {
        self.opt_str(key)
            .ok_or_else(|| self.bad(format!("`{key}` must be a string")))
    }

    fn array(&self, key: &str) -> Result<&Vec<Value>, HarnessError> {
        self.inputs
            .get(key)
            .and_then(Value::as_array)
            .ok_or_else(|| self.bad(format!("`{key}` must be an array")))
    }

    fn ints(&self, key: &str) -> Result<Vec<i32>, HarnessError> {
        self.array(key)?
            .iter()
            .map(|v| {
                v.as_i64()
                    .and_then(|v| i32::try_from(v).ok())
                    .ok_or_else(|| self.bad(format!("`{key}` element {v} is not an i32")))
            })
            .collect()
    }

    /// Floats as JSON numbers, or strings for values JSON cannot spell
    /// (`"nan"`, `"-inf"`, `"0x1p-149"`).
    fn floats(&self, key: &str) -> Result<Vec<f32>, HarnessError> {
        self.array(key)?
            .iter()
            .map(|v| match v {
                Value::Number(n) => n.as_f64().map(|f| f as f32),
                Value::String(s) => parse_float_literal(s),
                _ => None,
            })
            .map(|v| v.ok_or_else(|| self.bad(format!("`{key}` holds a non-float"))))
            .collect()
    }

    /// Integer field `key`, or `default` when absent.
    fn count(&self, key: &str, default: usize) -> Result<i32, HarnessError> {
        match self.inputs.get(key) {
            None => i32::try_from(default).map_err(|_| self.bad(format!("`{key}` too large"))),
            Some(v) => v
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .ok_or_else(|| self.bad(format!("`{key}` must be an i32"))),
        }
    }

    /// Number of scalar reads (`reads`, default 1).
    fn reads(&self) -> Result<usize, HarnessError> {
        Ok(self.count("reads", 1)?.max(0) as usize)
    }
}

fn parse_float_literal(text: &str) -> Option<f32> {
    sylib_core::float_text::parse_hex_float(text.as_bytes()).or_else(|| text.parse().ok())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn run(function: &str, inputs: Value, policy: FloatTextPolicy) -> String {
        execute_fixture_case(function, &inputs, policy).unwrap()
    }

    #[test]
    fn output_operations_render_console_text() {
        let hex = FloatTextPolicy::HexMinimal;
        assert_eq!(run("putint", json!({"values": [1, -2]}), hex), "1-2");
        assert_eq!(run("putch", json!({"values": [72, 105]}), hex), "Hi");
        assert_eq!(run("putfloat", json!({"values": [1.5, "-inf"]}), hex), "0x1.8p+0-inf");
        assert_eq!(run("putarray", json!({"values": [1, 2, 3]}), hex), "3: 1 2 3\n");
        assert_eq!(run("putarray", json!({"n": 0, "values": []}), hex), "0:\n");
        assert_eq!(
            run("putfarray", json!({"values": [2.0]}), FloatTextPolicy::Decimal),
            "1: 2.000000\n"
        );
    }

    #[test]
    fn putf_takes_tagged_arguments() {
        let out = run(
            "putf",
            json!({"format": "%d:%s:%c:%.1f\n", "args": [{"int": 4}, {"str": "ok"}, {"char": "z"}, {"float": 0.3}]}),
            FloatTextPolicy::HexMinimal,
        );
        assert_eq!(out, "4:ok:z:0.3\n");
    }

    #[test]
    fn input_operations_report_values() {
        let dec = FloatTextPolicy::Decimal;
        assert_eq!(run("getint", json!({"stdin": " 5 x", "reads": 2}), dec), "[5, 0]");
        assert_eq!(run("getch", json!({"stdin": "a\n", "reads": 3}), dec), "[97, 10, 0]");
        assert_eq!(run("getfloat", json!({"stdin": "0x1p+1"}), FloatTextPolicy::HexMinimal), "[2.0]");
        assert_eq!(
            run("getarray", json!({"stdin": "2 7 8", "capacity": 3}), dec),
            "n=2 [7, 8, 0]"
        );
        assert_eq!(
            run("getfarray", json!({"stdin": "1 0.5", "capacity": 1}), dec),
            "n=1 [0.5]"
        );
    }

    #[test]
    fn unknown_function_and_bad_inputs_error() {
        let hex = FloatTextPolicy::HexMinimal;
        assert!(matches!(
            execute_fixture_case("memcpy", &json!({}), hex),
            Err(HarnessError::UnknownFunction(_))
        ));
        assert!(matches!(
            execute_fixture_case("putint", &json!({"values": "nope"}), hex),
            Err(HarnessError::BadInput { .. })
        ));
    }

    #[test]
    fn putf_char_must_fit_one_byte() {
        let hex = FloatTextPolicy::HexMinimal;
        let out = run("putf", json!({"format": "[%c]", "args": [{"char": "~"}]}), hex);
        assert_eq!(out, "[~]");
        assert!(matches!(
            execute_fixture_case("putf", &json!({"format": "%c", "args": [{"char": "\u{20ac}"}]}), hex),
            Err(HarnessError::BadInput { .. })
        ));
    }

    #[test]
    fn runner_filters_by_policy_and_tags_shared_cases() {
        let fixture = FixtureSet::from_json(
            r#"{
                "version":"v1",
                "family":"output/float",
                "cases":[
                    {"name":"hex_half","function":"putfloat","inputs":{"values":[0.5]},"expected_output":"0x1p-1","policy":"hex"},
                    {"name":"dec_half","function":"putfloat","inputs":{"values":[0.5]},"expected_output":"0.500000","policy":"decimal"},
                    {"name":"ints","function":"putint","inputs":{"values":[7]},"expected_output":"7","policy":"both"}
                ]
            }"#,
        )
        .unwrap();

        let hex = TestRunner::new("smoke", FloatTextPolicy::HexMinimal).run(&fixture);
        assert_eq!(hex.len(), 2);
        assert!(hex.iter().all(|r| r.passed));
        assert_eq!(hex[1].case_name, "ints [hex]");

        let dec = TestRunner::new("smoke", FloatTextPolicy::Decimal).run(&fixture);
        assert_eq!(dec.len(), 2);
        assert!(dec.iter().all(|r| r.passed));
        assert_eq!(dec[0].case_name, "dec_half");
    }

    #[test]
    fn failing_case_carries_diff() {
        let fixture = FixtureSet::from_json(
            r#"{"version":"v1","family":"x","cases":[
                {"name":"wrong","function":"putint","inputs":{"values":[1]},"expected_output":"2"}
            ]}"#,
        )
        .unwrap();
        let results = TestRunner::new("diff", FloatTextPolicy::HexMinimal).run(&fixture);
        assert!(!results[0].passed);
        assert!(results[0].diff.as_deref().unwrap().contains("+1"));
    }
}
