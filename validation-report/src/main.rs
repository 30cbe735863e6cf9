// Copyright (c) The validation-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use clap::Parser;
use color_eyre::Result;
use validation_report::ReportApp;

fn main() -> Result<()> {
    color_eyre::install()?;

    let app = ReportApp::parse();
    let output = app.init_output();

    let result = app.exec(output, &mut std::io::stdout().lock());
    match result {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            error.display_to_stderr(&output.stderr_styles());
            std::process::exit(error.process_exit_code())
        }
    }
}
