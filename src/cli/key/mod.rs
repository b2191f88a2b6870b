//! Key command - prints the cache key for a prefix and parameters

use clap::Args;

use crate::domain::cache::{CacheKeyGenerator, CacheKeyParams, Sha256KeyGenerator};

/// Arguments for the key command
#[derive(Args, Clone)]
pub struct KeyArgs {
    /// Key namespace
    #[arg(long, default_value = "inference")]
    pub prefix: String,

    /// Ordered key parameters (e.g. model name, then query text)
    #[arg(required = true)]
    pub params: Vec<String>,
}

/// Run the key command
pub async fn run(args: KeyArgs) -> anyhow::Result<()> {
    println!("{}", derive(&args));
    Ok(())
}

fn derive(args: &KeyArgs) -> String {
    let params = args
        .params
        .iter()
        .fold(CacheKeyParams::new(&args.prefix), |acc, p| acc.with_param(p));

    Sha256KeyGenerator::new().generate(&params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::{derive_key, KEY_HEX_LEN};

    #[test]
    fn test_derive_matches_library() {
        let args = KeyArgs {
            prefix: "inference".to_string(),
            params: vec!["gpt-4".to_string(), "hello".to_string()],
        };

        let key = derive(&args);

        assert_eq!(key.len(), KEY_HEX_LEN);
        assert_eq!(key, derive_key("inference", ["gpt-4", "hello"]));
    }
}
