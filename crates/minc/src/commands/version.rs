//! Version command

use anyhow::Result;
use serde::Serialize;

use crate::cli::VersionArgs;

/// Build metadata baked in by the build script
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_date: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<&'static str>,
}

impl VersionInfo {
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            commit: option_env!("GIT_SHA"),
            build_date: option_env!("BUILD_DATE"),
            target: option_env!("TARGET"),
        }
    }

    /// `minc <version> [(<commit>)] [<target>]`
    pub fn short(&self) -> String {
        let mut line = format!("minc {}", self.version);
        if let Some(commit) = self.commit {
            line.push_str(&format!(" ({})", commit));
        }
        if let Some(target) = self.target {
            line.push(' ');
            line.push_str(target);
        }
        line
    }
}

pub fn run(args: VersionArgs) -> Result<()> {
    let info = VersionInfo::current();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("{}", info.short());
        if let Some(date) = info.build_date {
            println!("Built {}", date);
        }
    }

    Ok(())
}
