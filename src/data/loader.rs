// ============================================================
// Layer 4 — .ts File Loader
// ============================================================
// Reads UEA archive datasets stored in the sktime `.ts` format.
//
// File layout on disk:
//   <data_dir>/<Name>/<Name>_TRAIN.ts
//   <data_dir>/<Name>/<Name>_TEST.ts
//
// A .ts file looks like:
//
//   # free-text comments
//   @problemName BasicMotions
//   @timeStamps false
//   @univariate false
//   @classLabel true Standing Running Walking Badminton
//   @data
//   0.1,0.2,0.3:1.0,1.1,1.2:Standing
//
// Each data line holds one case: channels separated by ':', values
// within a channel separated by ',', and the class label last.
// A '?' marks a missing observation and is read as NaN.
//
// Only the subset of the format the UEA multivariate archive uses
// is supported: timestamped "(t,v)" values are rejected.

use anyhow::{bail, Context, Result};
use std::{fs, path::{Path, PathBuf}};

use crate::domain::catalog;
use crate::domain::series::RawSeries;
use crate::domain::traits::{SeriesSource, Split};

/// Loads UEA datasets from a directory of .ts files.
/// Implements the SeriesSource trait from Layer 3.
pub struct TsFileLoader {
    /// Root of the archive, e.g. data/UEA/Multivariate_ts
    dir: PathBuf,
}

impl TsFileLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of one split of one dataset
    pub fn path_for(&self, dataset: &str, split: Split) -> PathBuf {
        self.dir.join(dataset).join(format!("{dataset}_{split}.ts"))
    }
}

impl SeriesSource for TsFileLoader {
    fn load_split(&self, dataset: &str, split: Split) -> Result<Vec<RawSeries>> {
        if !catalog::is_valid_dataset(dataset) {
            bail!("Must specify a valid dataset name, got '{dataset}'");
        }

        let path = self.path_for(dataset, split);
        let cases = load_ts_file(&path)?;
        tracing::debug!("Loaded {} {} cases from '{}'", cases.len(), split, path.display());
        Ok(cases)
    }
}

/// Read and parse a single .ts file.
pub fn load_ts_file(path: &Path) -> Result<Vec<RawSeries>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;
    parse_ts(&text).with_context(|| format!("Malformed .ts file '{}'", path.display()))
}

/// Parse the contents of a .ts file into labelled cases.
pub fn parse_ts(text: &str) -> Result<Vec<RawSeries>> {
    let mut in_data   = false;
    let mut has_label = true;
    let mut cases     = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if !in_data {
            if !line.starts_with('@') {
                bail!("line {}: expected a header line before @data", line_no + 1);
            }
            let mut parts = line.split_whitespace();
            let key       = parts.next().unwrap_or_default().to_ascii_lowercase();
            let value     = parts.next().map(str::to_ascii_lowercase);
            match key.as_str() {
                "@data" => in_data = true,
                "@timestamps" if value.as_deref() == Some("true") => {
                    bail!("timestamped .ts files are not supported");
                }
                "@classlabel" => has_label = value.as_deref() != Some("false"),
                _ => {}
            }
            continue;
        }

        cases.push(
            parse_case(line, has_label)
                .with_context(|| format!("line {}", line_no + 1))?,
        );
    }

    if !in_data {
        bail!("no @data section found");
    }
    Ok(cases)
}

/// Parse one data line: `c1v1,c1v2:c2v1,c2v2:label`
fn parse_case(line: &str, has_label: bool) -> Result<RawSeries> {
    if line.contains('(') {
        bail!("timestamped values are not supported");
    }

    let mut fields: Vec<&str> = line.split(':').collect();
    let label = if has_label {
        match fields.pop() {
            Some(label) if !fields.is_empty() => label.trim().to_string(),
            _ => bail!("case has no channels"),
        }
    } else {
        String::new()
    };

    let channels = fields
        .iter()
        .map(|field| parse_channel(field))
        .collect::<Result<Vec<_>>>()?;

    if channels.iter().any(Vec::is_empty) {
        bail!("case has an empty channel");
    }
    Ok(RawSeries::new(channels, label))
}

fn parse_channel(field: &str) -> Result<Vec<f32>> {
    field
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| {
            if v == "?" || v.eq_ignore_ascii_case("nan") {
                Ok(f32::NAN)
            } else {
                v.parse::<f32>().with_context(|| format!("bad value '{v}'"))
            }
        })
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# BasicMotions excerpt
@problemName BasicMotions
@timeStamps false
@univariate false
@classLabel true Standing Running
@data
0.1,0.2,0.3:1.0,1.1,1.2:Standing
0.5,?,0.7:2.0,2.1,2.2:Running
";

    #[test]
    fn test_parses_channels_and_labels() {
        let cases = parse_ts(SAMPLE).unwrap();
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].label, "Standing");
        assert_eq!(cases[0].num_channels(), 2);
        assert_eq!(cases[0].channels[1], vec![1.0, 1.1, 1.2]);
        assert_eq!(cases[1].label, "Running");
    }

    #[test]
    fn test_question_mark_is_nan() {
        let cases = parse_ts(SAMPLE).unwrap();
        assert!(cases[1].channels[0][1].is_nan());
    }

    #[test]
    fn test_rejects_timestamps() {
        let text = "@timeStamps true\n@data\n(0,1.0),(1,2.0):a\n";
        assert!(parse_ts(text).is_err());
    }

    #[test]
    fn test_requires_data_section() {
        assert!(parse_ts("@problemName X\n").is_err());
    }

    #[test]
    fn test_rejects_unknown_dataset() {
        let loader = TsFileLoader::new("does/not/matter");
        assert!(loader.load_split("NotADataset", Split::Train).is_err());
    }

    #[test]
    fn test_path_layout() {
        let loader = TsFileLoader::new("data");
        let path   = loader.path_for("ERing", Split::Test);
        assert_eq!(path, PathBuf::from("data/ERing/ERing_TEST.ts"));
    }
}
