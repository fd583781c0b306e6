//! Persistence for run reports - write Markdown and JSON artifacts.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SanityError};

use super::SanityReport;

/// Paths of the artifacts written for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportArtifacts {
    pub markdown: PathBuf,
    pub json: PathBuf,
}

/// File stem shared by both artifacts, e.g.
/// `export_sanity_report_20240501T120000Z`.
pub fn artifact_stem(run_timestamp: &DateTime<Utc>) -> String {
    format!(
        "export_sanity_report_{}",
        run_timestamp.format("%Y%m%dT%H%M%SZ")
    )
}

impl SanityReport {
    /// Write `<stem>.md` and `<stem>.json` into `outdir`, creating it if needed.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use bnchmrk::SanityReport;
    /// # fn example(report: &SanityReport) -> bnchmrk::Result<()> {
    /// let artifacts = report.write_artifacts("reports")?;
    /// println!("{}", artifacts.markdown.display());
    /// # Ok(())
    /// # }
    /// ```
    pub fn write_artifacts(&self, outdir: impl AsRef<Path>) -> Result<ReportArtifacts> {
        let outdir = outdir.as_ref();

        if !outdir.exists() {
            fs::create_dir_all(outdir).map_err(|e| {
                SanityError::Persistence(format!(
                    "Failed to create directory '{}': {}",
                    outdir.display(),
                    e
                ))
            })?;
        }

        let stem = artifact_stem(&self.run_timestamp);
        let markdown = outdir.join(format!("{}.md", stem));
        let json = outdir.join(format!("{}.json", stem));

        let mut writer = create(&markdown)?;
        writer
            .write_all(self.to_markdown().as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|e| {
                SanityError::Persistence(format!(
                    "Failed to write '{}': {}",
                    markdown.display(),
                    e
                ))
            })?;

        self.write_json(create(&json)?, &json)?;

        Ok(ReportArtifacts { markdown, json })
    }

    /// Serialize into `writer` and flush it so write errors surface here.
    fn write_json<W: Write>(&self, mut writer: W, path: &Path) -> Result<()> {
        serde_json::to_writer_pretty(&mut writer, self).map_err(|e| {
            SanityError::Persistence(format!("Failed to serialize report: {}", e))
        })?;
        writer.flush().map_err(|e| {
            SanityError::Persistence(format!("Failed to write '{}': {}", path.display(), e))
        })
    }

    /// Load a JSON report written by [`SanityReport::write_artifacts`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| {
            SanityError::Persistence(format!(
                "Failed to open file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let reader = BufReader::new(file);
        let report = serde_json::from_reader(reader).map_err(|e| {
            SanityError::Persistence(format!(
                "Failed to parse report '{}': {}",
                path.display(),
                e
            ))
        })?;

        Ok(report)
    }
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).map_err(|e| {
        SanityError::Persistence(format!(
            "Failed to create file '{}': {}",
            path.display(),
            e
        ))
    })?;
    Ok(BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExportSanity, SanityInputs};
    use chrono::TimeZone;
    use std::io;
    use tempfile::TempDir;

    /// Accepts nothing; every write and flush fails.
    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("no space left on device"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::other("no space left on device"))
        }
    }

    fn sample_report(dir: &Path) -> SanityReport {
        let write = |name: &str, content: &str| {
            let path = dir.join(name);
            fs::write(&path, content).unwrap();
            path
        };
        let inputs = SanityInputs::new(
            write(
                "fact.csv",
                "year_num,state_cnty_fips_cd,naics2_sector_cd,abs_firms,abs_emp,abs_payroll_usd_amt,abs_rcpt_usd_amt,qcew_emp,qcew_wages_usd,qcew_avg_weekly_wage_usd\n\
                 2022,48201,42,10,100,1000,5000,90,900,50\n",
            ),
            write("naics.csv", "naics2_sector_cd,naics2_sector_name\n42,Wholesale Trade\n"),
            write("county.csv", "state_cnty_fips_cd,county_name,state_abbr\n48201,Harris,TX\n"),
        );
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        ExportSanity::new().run_at(&inputs, ts).unwrap()
    }

    #[test]
    fn test_artifact_stem() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 3, 4).unwrap();
        assert_eq!(artifact_stem(&ts), "export_sanity_report_20240501T120304Z");
    }

    #[test]
    fn test_json_flush_error_is_reported() {
        let dir = TempDir::new().unwrap();
        let report = sample_report(dir.path());

        // Small enough to sit in the buffer until the explicit flush
        let writer = BufWriter::with_capacity(1 << 20, FullDisk);
        let result = report.write_json(writer, Path::new("report.json"));

        match result {
            Err(SanityError::Persistence(msg)) => assert!(msg.contains("report.json"), "{}", msg),
            other => panic!("expected persistence error, got {:?}", other),
        }
    }
}
