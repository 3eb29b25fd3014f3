//! Strength command implementation.

use anyhow::Result;
use clap::Args;

use vaultguard_core::policy::{MIN_PASSWORD_LENGTH, PasswordStrength};

use crate::output;

#[derive(Args, Debug)]
pub struct StrengthArgs {
    /// Password to check
    pub password: String,
}

pub fn run(args: StrengthArgs) -> Result<()> {
    let strength = PasswordStrength::evaluate(&args.password);

    output::rule(
        strength.length,
        &format!("At least {} characters", MIN_PASSWORD_LENGTH),
    );
    output::rule(strength.upper, "Uppercase letter");
    output::rule(strength.lower, "Lowercase letter");
    output::rule(strength.digit, "Number");
    output::rule(strength.symbol, "Special character");
    println!();
    output::field(
        "Score",
        &format!("{}/{}", strength.score(), PasswordStrength::MAX_SCORE),
    );

    Ok(())
}
