//! Development token command.
//!
//! Signs a token with the same secret and algorithm the server verifies with
//! (`API_JWT_SECRET`, `API_JWT_ALGORITHM`).

use chrono::TimeDelta;
use inventory_api::auth::issue_token;
use inventory_api::config::JwtConfig;
use inventory_core::Email;

/// Print a signed bearer token to stdout.
///
/// # Errors
///
/// Returns an error if the token settings are missing or weak, the email is
/// invalid, or `ttl_minutes` is not positive or too large.
pub fn run(
    sub: &str,
    email: &str,
    role: Option<&str>,
    ttl_minutes: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    let ttl = ttl(ttl_minutes)?;

    let config = JwtConfig::from_env()?;
    let email = Email::parse(email)?;
    let token = issue_token(&config, sub, &email, role, ttl)?;

    tracing::info!(sub, %email, ttl_minutes, "Token issued");

    #[allow(clippy::print_stdout)]
    {
        println!("{token}");
    }
    Ok(())
}

fn ttl(minutes: i64) -> Result<TimeDelta, &'static str> {
    if minutes <= 0 {
        return Err("--ttl-minutes must be positive");
    }
    TimeDelta::try_minutes(minutes).ok_or("--ttl-minutes is too large")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_bounds() {
        assert_eq!(ttl(30), Ok(TimeDelta::minutes(30)));
        assert_eq!(ttl(0), Err("--ttl-minutes must be positive"));
        assert_eq!(ttl(-5), Err("--ttl-minutes must be positive"));
        assert_eq!(ttl(i64::MAX), Err("--ttl-minutes is too large"));
    }
}
