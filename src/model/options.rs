//! argv-style model options.
//!
//! Options are parsed with clap from a token list (`from_args`), a single
//! whitespace-separated string (`from_arg_str`) or typed key/value pairs
//! (`from_pairs`).

use std::ffi::OsString;

use clap::{Parser, ValueEnum};

use crate::error::TaggerError;
use crate::lattice::{RequestKind, RequestType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatType {
    /// `surface\tfeature` per node, then the EOS format.
    #[default]
    Lattice,
    /// Surfaces separated by spaces.
    Wakati,
    /// A JSON description of every node.
    Dump,
}

#[derive(Debug, Clone, Default, PartialEq, Parser)]
#[command(
    name = "lattice-tagger",
    no_binary_name = true,
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct ModelOptions {
    #[arg(short = 'O', long = "output-format-type", value_enum, default_value_t = OutputFormatType::Lattice)]
    pub output_format_type: OutputFormatType,

    #[arg(short = 'F', long = "node-format")]
    pub node_format: Option<String>,

    #[arg(short = 'U', long = "unk-format")]
    pub unk_format: Option<String>,

    #[arg(short = 'B', long = "bos-format")]
    pub bos_format: Option<String>,

    #[arg(short = 'E', long = "eos-format")]
    pub eos_format: Option<String>,

    #[arg(short = 'S', long = "eon-format")]
    pub eon_format: Option<String>,

    /// Feature given to unknown-word nodes instead of the configured default.
    #[arg(short = 'x', long = "unk-feature")]
    pub unk_feature: Option<String>,

    #[arg(short = 't', long = "theta")]
    pub theta: Option<f64>,

    /// Request N-best enumeration on new lattices.
    #[arg(short = 'N', long = "nbest")]
    pub nbest: Option<usize>,

    #[arg(short = 'm', long = "marginal")]
    pub marginal: bool,

    #[arg(short = 'a', long = "all-morphs")]
    pub all_morphs: bool,

    #[arg(short = 'p', long = "partial")]
    pub partial: bool,
}

/// Typed option names for [`ModelOptions::from_pairs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKey {
    OutputFormatType,
    NodeFormat,
    UnkFormat,
    BosFormat,
    EosFormat,
    EonFormat,
    UnkFeature,
    Theta,
    Nbest,
    Marginal,
    AllMorphs,
    Partial,
}

impl OptionKey {
    pub fn as_flag(self) -> &'static str {
        match self {
            OptionKey::OutputFormatType => "--output-format-type",
            OptionKey::NodeFormat => "--node-format",
            OptionKey::UnkFormat => "--unk-format",
            OptionKey::BosFormat => "--bos-format",
            OptionKey::EosFormat => "--eos-format",
            OptionKey::EonFormat => "--eon-format",
            OptionKey::UnkFeature => "--unk-feature",
            OptionKey::Theta => "--theta",
            OptionKey::Nbest => "--nbest",
            OptionKey::Marginal => "--marginal",
            OptionKey::AllMorphs => "--all-morphs",
            OptionKey::Partial => "--partial",
        }
    }

    fn is_switch(self) -> bool {
        matches!(
            self,
            OptionKey::Marginal | OptionKey::AllMorphs | OptionKey::Partial
        )
    }
}

impl ModelOptions {
    pub fn from_args<I, T>(args: I) -> Result<Self, TaggerError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let options =
            Self::try_parse_from(args).map_err(|e| TaggerError::InvalidOptions(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Parse a single option string, split on whitespace. Format templates
    /// containing spaces must use the `\s` escape.
    pub fn from_arg_str(args: &str) -> Result<Self, TaggerError> {
        Self::from_args(args.split_whitespace())
    }

    /// Build from key/value pairs. Values of switches are ignored.
    pub fn from_pairs(pairs: &[(OptionKey, &str)]) -> Result<Self, TaggerError> {
        let mut args: Vec<String> = Vec::with_capacity(pairs.len() * 2);
        for (key, value) in pairs {
            if key.is_switch() {
                args.push(key.as_flag().to_string());
            } else {
                args.push(format!("{}={}", key.as_flag(), value));
            }
        }
        Self::from_args(args)
    }

    pub(crate) fn validate(&self) -> Result<(), TaggerError> {
        if let Some(theta) = self.theta {
            if !(theta.is_finite() && theta > 0.0) {
                return Err(TaggerError::InvalidOptions(format!(
                    "theta must be a positive finite number, got {theta}"
                )));
            }
        }
        if self.nbest == Some(0) {
            return Err(TaggerError::InvalidOptions(
                "nbest must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Request flags new lattices start with.
    pub fn request_type(&self) -> RequestType {
        let mut request = if self.nbest.is_some() {
            RequestType::from(RequestKind::NBest)
        } else {
            RequestType::one_best()
        };
        if self.marginal {
            request.insert(RequestKind::MarginalProb);
        }
        if self.all_morphs {
            request.insert(RequestKind::AllMorphs);
        }
        if self.partial {
            request.insert(RequestKind::Partial);
        }
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = ModelOptions::from_args(Vec::<String>::new()).unwrap();
        assert_eq!(opts, ModelOptions::default());
        assert_eq!(opts.output_format_type, OutputFormatType::Lattice);
        assert_eq!(opts.request_type(), RequestType::one_best());
    }

    #[test]
    fn test_from_arg_str() {
        let opts = ModelOptions::from_arg_str("-O wakati -N 3 -m -t 0.5").unwrap();
        assert_eq!(opts.output_format_type, OutputFormatType::Wakati);
        assert_eq!(opts.nbest, Some(3));
        assert!(opts.marginal);
        assert_eq!(opts.theta, Some(0.5));
        let request = opts.request_type();
        assert!(request.contains(RequestKind::NBest));
        assert!(request.contains(RequestKind::MarginalProb));
        assert!(!request.contains(RequestKind::OneBest));
    }

    #[test]
    fn test_long_flags() {
        let opts = ModelOptions::from_args([
            "--node-format=%m\\t%H\\n",
            "--unk-feature",
            "名詞,未知語",
            "--all-morphs",
        ])
        .unwrap();
        assert_eq!(opts.node_format.as_deref(), Some("%m\\t%H\\n"));
        assert_eq!(opts.unk_feature.as_deref(), Some("名詞,未知語"));
        assert!(opts.request_type().contains(RequestKind::AllMorphs));
    }

    #[test]
    fn test_from_pairs() {
        let opts = ModelOptions::from_pairs(&[
            (OptionKey::OutputFormatType, "dump"),
            (OptionKey::EosFormat, "END\\n"),
            (OptionKey::Partial, ""),
        ])
        .unwrap();
        assert_eq!(opts.output_format_type, OutputFormatType::Dump);
        assert_eq!(opts.eos_format.as_deref(), Some("END\\n"));
        assert!(opts.partial);
    }

    #[test]
    fn test_invalid_options() {
        assert!(matches!(
            ModelOptions::from_arg_str("--no-such-flag"),
            Err(TaggerError::InvalidOptions(_))
        ));
        assert!(ModelOptions::from_arg_str("-O html").is_err());
        assert!(ModelOptions::from_arg_str("-t -1").is_err());
        assert!(ModelOptions::from_arg_str("-t 0").is_err());
        assert!(ModelOptions::from_arg_str("-N 0").is_err());
    }
}
