use std::io::{self, Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tspec_core::{
    ColumnDefinition, ColumnOptions, Diagnostics, EnumDefinition, ParsedSchema, TableDefinition,
    to_pascal_case, value_to_string,
};

use super::SchemaBackend;
use crate::builder::column_definition;
use crate::error::FallbackError;

/// Ruby program evaluating the schema with recording stubs.
const EXTRACT_SCRIPT: &str = include_str!("extract.rb");

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How to run the external fallback parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FallbackConfig {
    /// Executable to launch.
    pub command: String,
    /// Arguments for `command`. When empty, the bundled extraction script
    /// is passed as `-e <script>`.
    pub args: Vec<String>,
    /// Kill the parser and report an error after this many seconds.
    pub timeout_secs: Option<u64>,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            command: "ruby".to_string(),
            args: Vec::new(),
            timeout_secs: None,
        }
    }
}

impl FallbackConfig {
    fn arguments(&self) -> Vec<&str> {
        if self.args.is_empty() {
            vec!["-e", EXTRACT_SCRIPT]
        } else {
            self.args.iter().map(String::as_str).collect()
        }
    }
}

/// Runs an external parser: schema text on stdin, one JSON object on stdout.
pub struct FallbackBackend {
    config: FallbackConfig,
    /// Why the native parser is not used, repeated in every result.
    reason: String,
}

struct ProcessOutput {
    status: ExitStatus,
    stdout: Vec<u8>,
    stderr: String,
}

impl FallbackBackend {
    pub fn new(config: FallbackConfig, reason: impl Into<String>) -> Self {
        Self {
            config,
            reason: reason.into(),
        }
    }

    fn run(&self, source: &str) -> Result<ProcessOutput, FallbackError> {
        let mut child = Command::new(&self.config.command)
            .args(self.config.arguments())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| FallbackError::Launch {
                command: self.config.command.clone(),
                source,
            })?;

        // Feed stdin and drain both pipes on their own threads so a child
        // producing lots of output cannot block on a full pipe.
        let stdin = child.stdin.take();
        let input = source.to_owned();
        let writer = thread::spawn(move || -> io::Result<()> {
            if let Some(mut stdin) = stdin {
                stdin.write_all(input.as_bytes())?;
            }
            Ok(())
        });
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = self.wait(&mut child)?;

        // A child that exits without reading its input breaks the pipe;
        // the exit status tells the real story.
        if let Ok(Err(err)) = writer.join() {
            tracing::debug!(error = %err, "fallback parser did not consume stdin");
        }

        Ok(ProcessOutput {
            status,
            stdout: collect(stdout)?,
            stderr: String::from_utf8_lossy(&collect(stderr)?).into_owned(),
        })
    }

    fn wait(&self, child: &mut Child) -> Result<ExitStatus, FallbackError> {
        let Some(secs) = self.config.timeout_secs else {
            return Ok(child.wait()?);
        };

        let deadline = Instant::now() + Duration::from_secs(secs);
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                if let Err(err) = child.kill().and_then(|()| child.wait().map(drop)) {
                    tracing::warn!(error = %err, "failed to kill fallback parser");
                }
                return Err(FallbackError::Timeout(secs));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn interpret(output: ProcessOutput) -> ParsedSchema {
        let mut schema = match decode(&output.stdout) {
            Ok(schema) => schema,
            Err(err) => {
                let err = FallbackError::from(err);
                tracing::warn!(error = %err, "fallback parser output rejected");
                ParsedSchema::failed(err.to_string())
            }
        };

        if !output.status.success() {
            let err = FallbackError::NonZeroExit {
                status: describe_status(output.status),
                stderr: output.stderr,
            };
            tracing::warn!(error = %err, "fallback parser failed");
            schema.diagnostics.error(err.to_string());
        }
        schema
    }
}

impl SchemaBackend for FallbackBackend {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn parse(&self, source: &str) -> ParsedSchema {
        let mut schema = match self.run(source) {
            Ok(output) => Self::interpret(output),
            Err(err) => {
                tracing::warn!(error = %err, command = %self.config.command, "fallback parser failed");
                ParsedSchema::failed(err.to_string())
            }
        };
        schema
            .diagnostics
            .warn(format!("fallback parser used: {}", self.reason));
        schema
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn collect(handle: JoinHandle<io::Result<Vec<u8>>>) -> Result<Vec<u8>, FallbackError> {
    let bytes = handle
        .join()
        .unwrap_or_else(|_| Err(io::Error::other("pipe reader panicked")))?;
    Ok(bytes)
}

fn describe_status(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => code.to_string(),
        None => "(terminated by signal)".to_string(),
    }
}

/// Decode the parser's JSON output, accepting snake_case or camelCase names
/// and diagnostics either at the top level or under `diagnostics`.
fn decode(stdout: &[u8]) -> Result<ParsedSchema, serde_json::Error> {
    let raw: RawSchema = serde_json::from_slice(stdout)?;
    Ok(raw.into_schema())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSchema {
    tables: Vec<RawTable>,
    enums: Vec<RawEnum>,
    errors: Vec<Value>,
    warnings: Vec<Value>,
    diagnostics: Option<RawDiagnostics>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDiagnostics {
    errors: Vec<Value>,
    warnings: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTable {
    name: String,
    #[serde(default, alias = "class_name")]
    class_name: Option<String>,
    #[serde(default)]
    columns: Vec<RawColumn>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawColumn {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    options: Map<String, Value>,
    #[serde(default, alias = "enum_name")]
    enum_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEnum {
    name: String,
    #[serde(default, alias = "class_name")]
    class_name: Option<String>,
    #[serde(default)]
    values: Vec<Value>,
}

impl RawSchema {
    fn into_schema(self) -> ParsedSchema {
        let mut diagnostics = Diagnostics::new();
        let nested = self.diagnostics.unwrap_or_default();
        for error in self.errors.iter().chain(&nested.errors) {
            diagnostics.error(value_to_string(error));
        }
        for warning in self.warnings.iter().chain(&nested.warnings) {
            diagnostics.warn(value_to_string(warning));
        }

        ParsedSchema {
            tables: self.tables.into_iter().map(RawTable::into_table).collect(),
            enums: self.enums.into_iter().map(RawEnum::into_enum).collect(),
            diagnostics,
        }
    }
}

impl RawTable {
    fn into_table(self) -> TableDefinition {
        TableDefinition {
            class_name: class_name_or_derived(self.class_name, &self.name),
            name: self.name,
            columns: self.columns.into_iter().map(RawColumn::into_column).collect(),
        }
    }
}

impl RawColumn {
    fn into_column(self) -> ColumnDefinition {
        let options: ColumnOptions = self.options.into_iter().collect();
        let mut column = column_definition(self.name, self.ty, options);
        if column.ty == "enum" {
            if let Some(name) = self.enum_name.filter(|n| !n.is_empty()) {
                column.enum_name = Some(name);
            }
        }
        column
    }
}

impl RawEnum {
    fn into_enum(self) -> EnumDefinition {
        EnumDefinition {
            class_name: class_name_or_derived(self.class_name, &self.name),
            name: self.name,
            values: self
                .values
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        }
    }
}

fn class_name_or_derived(class_name: Option<String>, name: &str) -> String {
    class_name
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| to_pascal_case(name))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn decode_value(value: Value) -> ParsedSchema {
        decode(value.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn test_decode_snake_case_output() {
        let schema = decode_value(json!({
            "tables": [{
                "name": "order_items",
                "columns": [
                    { "name": "state", "type": "enum", "options": { "enum_type": "item_state" } },
                    { "name": "kind", "type": "enum", "options": {}, "enum_name": "Kind" },
                    { "name": "qty", "type": "integer", "options": { "null": false }, "enum_name": "Bogus" }
                ]
            }],
            "enums": [{ "name": "item_state", "class_name": "ItemState", "values": ["new", 1, "done"] }],
            "errors": [],
            "warnings": ["careful"]
        }));

        let table = &schema.tables[0];
        assert_eq!(table.class_name, "OrderItems");
        assert_eq!(table.columns[0].enum_name.as_deref(), Some("ItemState"));
        assert_eq!(table.columns[1].enum_name.as_deref(), Some("Kind"));
        assert_eq!(table.columns[2].enum_name, None);
        assert!(table.columns[2].is_required());
        assert_eq!(schema.enums[0].values, ["new", "done"]);
        assert_eq!(schema.diagnostics.warnings, ["careful"]);
    }

    #[test]
    fn test_decode_nested_diagnostics_and_camel_case() {
        let schema = decode_value(json!({
            "tables": [{ "name": "users", "className": "Person", "columns": [] }],
            "diagnostics": { "errors": ["bad"], "warnings": [] }
        }));
        assert_eq!(schema.tables[0].class_name, "Person");
        assert_eq!(schema.diagnostics.errors, ["bad"]);
    }

    #[test]
    fn test_decode_rejects_non_json() {
        assert!(decode(b"not json").is_err());
        assert!(decode(b"").is_err());
        assert!(decode(b"[1, 2]").is_err());
    }

    #[test]
    fn test_default_arguments_use_bundled_script() {
        let config = FallbackConfig::default();
        let args = config.arguments();
        assert_eq!(args[0], "-e");
        assert!(args[1].contains("create_table"));

        let config = FallbackConfig {
            args: vec!["extract.rb".into()],
            ..FallbackConfig::default()
        };
        assert_eq!(config.arguments(), ["extract.rb"]);
    }

    #[test]
    fn test_launch_failure_is_empty_result() {
        let backend = FallbackBackend::new(
            FallbackConfig {
                command: "tspec-no-such-parser".into(),
                ..FallbackConfig::default()
            },
            "testing",
        );
        let schema = backend.parse("create_table \"t\" do |t| end");

        assert!(schema.is_empty());
        assert_eq!(schema.diagnostics.errors.len(), 1);
        assert!(schema.diagnostics.errors[0].contains("failed to launch"));
        assert_eq!(schema.diagnostics.warnings, ["fallback parser used: testing"]);
    }

    #[cfg(unix)]
    fn shell(script: &str, timeout_secs: Option<u64>) -> FallbackBackend {
        FallbackBackend::new(
            FallbackConfig {
                command: "sh".into(),
                args: vec!["-c".into(), script.into()],
                timeout_secs,
            },
            "native parser disabled",
        )
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_keeps_partial_data() {
        let backend = shell(
            r#"cat >/dev/null; echo '{"enums":[{"name":"mood","values":["ok"]}]}'; exit 2"#,
            None,
        );
        let schema = backend.parse("ignored");
        assert_eq!(schema.enums[0].class_name, "Mood");
        assert_eq!(
            schema.diagnostics.errors,
            ["fallback parser exited with non-zero status 2"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_non_json_output() {
        let schema = shell("echo oops", None).parse("");
        assert!(schema.is_empty());
        assert_eq!(schema.diagnostics.errors.len(), 1);
        assert!(schema.diagnostics.errors[0].starts_with("fallback parser output is not valid JSON"));
    }

    #[cfg(unix)]
    #[test]
    fn test_reads_schema_from_stdin() {
        // Echo the input back as the single error entry
        let backend = shell(
            r#"input=$(cat); printf '{"errors":["%s"]}' "$input""#,
            Some(30),
        );
        let schema = backend.parse("hello");
        assert_eq!(schema.diagnostics.errors, ["hello"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_parser() {
        let schema = shell("exec sleep 10", Some(1)).parse("");
        assert!(schema.is_empty());
        assert_eq!(
            schema.diagnostics.errors,
            ["fallback parser timed out after 1s and was killed"]
        );
        assert_eq!(schema.diagnostics.warnings.len(), 1);
    }
}
