//! Deterministic mock synthesizer for dry runs
//!
//! Produces the same canned, deliberately broken candidate for every attempt
//! so the whole pipeline can be exercised without a model behind it. The
//! reply is shaped like a model response and goes through the same
//! code-fence extraction as a real one would.

use async_trait::async_trait;

use super::{SynthesisError, Synthesizer, extract_code_block};
use crate::dataset::Problem;
use crate::toolchain::Language;

/// Synthesizer that fabricates candidates locally
pub struct MockSynthesizer {
    language: Language,
}

impl MockSynthesizer {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    fn canned_program(&self) -> &'static str {
        match self.language {
            Language::Python => {
                "def solve():\n    x = \n    print(x)\n\nsolve()\n"
            }
            Language::Rust => {
                "fn main() {\n    let x = 42\n    println!(\"{}\", undefined_var);\n}\n"
            }
            Language::Ocaml => {
                "let solve () =\n  let x = 42\n  print_endline undefined_var\n\nlet () = solve ()\n"
            }
        }
    }
}

#[async_trait]
impl Synthesizer for MockSynthesizer {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn language(&self) -> Language {
        self.language
    }

    async fn synthesize(&self, problem: &Problem) -> Result<String, SynthesisError> {
        tracing::debug!(src_uid = %problem.src_uid, "producing mock candidate");

        let reply = format!(
            "Here's my solution to the problem:\n\n\
             The problem asks for a {} program, so:\n\n\
             ```{}\n{}```\n\n\
             This should handle the given samples.",
            self.language,
            self.language.as_str(),
            self.canned_program(),
        );

        Ok(extract_code_block(&reply, self.language))
    }
}
