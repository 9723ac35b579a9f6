macro_rules! env_or_none {
    ($name:ident, $env:literal) => {
        #[allow(dead_code)]
        pub const $name: &str = match option_env!($env) {
            Some(val) => val,
            None => "<none>",
        };
    };
}

#[allow(dead_code)]
pub const PACKAGE: &str = "spacepacket";
env_or_none!(VERSION, "CARGO_PKG_VERSION");
env_or_none!(BUILD_TIMESTAMP, "VERGEN_BUILD_TIMESTAMP");
env_or_none!(RUSTC_COMMIT_HASH, "VERGEN_RUSTC_COMMIT_HASH");

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_version_from_cargo() {
        assert_eq!(VERSION, env!("CARGO_PKG_VERSION"));
        assert_eq!(PACKAGE, "spacepacket");
    }
}
