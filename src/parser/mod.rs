//! Command-line classification and input loading.
pub mod loader;

use std::ffi::OsString;
use std::path::PathBuf;

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::model::CompileRequest;

/// Leading byte that marks a compiler option.
pub const OPTION_MARKER: u8 = b'-';

/// Split the arguments (without the program name) into compiler options and
/// input paths.
///
/// Tokens starting with [`OPTION_MARKER`] are options and are kept verbatim;
/// everything else is an input file. Relative order is preserved in both
/// groups. An empty argument list is a usage error.
///
/// Paths stay `OsString`s, so a file name that is not valid UTF-8 is still
/// an input.
pub fn classify<I, S>(program: &str, args: I) -> Result<CompileRequest>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut options = Vec::new();
    let mut inputs = Vec::new();
    let mut seen = 0usize;

    for arg in args {
        let arg: OsString = arg.into();
        seen += 1;
        if arg.as_encoded_bytes().first() == Some(&OPTION_MARKER) {
            options.push(option_string(arg));
        } else {
            inputs.push(PathBuf::from(arg));
        }
    }

    if seen == 0 {
        return Err(Error::Usage {
            program: program.to_string(),
        });
    }

    debug!("{} option(s), {} input(s)", options.len(), inputs.len());
    Ok(CompileRequest { options, inputs })
}

// libNVVM options are ASCII; anything else is passed on lossily.
fn option_string(arg: OsString) -> String {
    arg.into_string().unwrap_or_else(|arg| {
        let lossy = arg.to_string_lossy().into_owned();
        warn!("option {lossy:?} is not valid UTF-8");
        lossy
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_splits_on_marker() {
        let test_cases = vec![
            (
                vec!["a.ll"],
                CompileRequest {
                    options: vec![],
                    inputs: vec!["a.ll".into()],
                },
            ),
            (
                vec!["-arch=compute_70", "a.ll", "b.bc", "-opt=0"],
                CompileRequest {
                    options: vec!["-arch=compute_70".into(), "-opt=0".into()],
                    inputs: vec!["a.ll".into(), "b.bc".into()],
                },
            ),
            (
                vec!["-g"],
                CompileRequest {
                    options: vec!["-g".into()],
                    inputs: vec![],
                },
            ),
        ];

        for (input, expected) in test_cases {
            let result = classify("ptxgen", input);
            assert_eq!(result.expect("classifies"), expected);
        }
    }

    #[test]
    fn test_classify_keeps_options_verbatim() {
        let req = classify("ptxgen", ["--", "-", "-ftz=1 ", "-prec-div=0"]).unwrap();
        assert_eq!(req.options, ["--", "-", "-ftz=1 ", "-prec-div=0"]);
        assert!(req.inputs.is_empty());
    }

    #[test]
    fn test_classify_preserves_input_order() {
        let req = classify("ptxgen", ["z.ll", "-x", "a.ll", "m.ll"]).unwrap();
        let names: Vec<_> = req.inputs.iter().map(|p| p.to_str().unwrap()).collect();
        assert_eq!(names, ["z.ll", "a.ll", "m.ll"]);
    }

    #[test]
    fn test_classify_marker_only_counts_when_leading() {
        let req = classify("ptxgen", ["dir/-odd.ll", "x-y.bc"]).unwrap();
        assert!(req.options.is_empty());
        assert_eq!(req.inputs.len(), 2);
    }

    #[test]
    fn test_classify_empty_is_usage_error() {
        let err = classify("ptxgen", Vec::<OsString>::new()).unwrap_err();
        assert!(matches!(err, Error::Usage { ref program } if program == "ptxgen"));
        assert_eq!(
            err.to_string(),
            "Usage: ptxgen [options] ir-file-1 [ir-file-2 [ir-file-3 ...]]"
        );
    }

    #[test]
    fn test_classify_double_dash_is_an_option_anywhere() {
        let test_cases = vec![
            (vec!["--", "a.ll"], vec!["--"], 1),
            (vec!["a.ll", "--"], vec!["--"], 1),
            (vec!["--"], vec!["--"], 0),
            (vec!["--", "a.ll", "--"], vec!["--", "--"], 1),
        ];

        for (input, options, inputs) in test_cases {
            let req = classify("ptxgen", input).expect("classifies");
            assert_eq!(req.options, options);
            assert_eq!(req.inputs.len(), inputs);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_classify_keeps_non_utf8_paths() {
        use std::os::unix::ffi::OsStringExt;

        let raw = OsString::from_vec(b"k\xff.ll".to_vec());
        let req = classify("ptxgen", [raw.clone()]).unwrap();
        assert!(req.options.is_empty());
        assert_eq!(req.inputs, [PathBuf::from(raw)]);
    }
}
