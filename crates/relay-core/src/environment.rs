//! Environment routing.

use std::fmt;
use std::str::FromStr;

use crate::context::Context;

/// Deployment environment an image is published into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Environment {
    Dev,
    Test,
    Int,
    Prod,
    /// Per-feature-branch namespace, distinct from every fixed environment.
    Feature,
}

impl Environment {
    pub const ALL: [Self; 5] = [Self::Dev, Self::Test, Self::Int, Self::Prod, Self::Feature];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Test => "test",
            Self::Int => "int",
            Self::Prod => "prod",
            Self::Feature => "development",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|env| env.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| crate::Error::UnknownEnvironment(s.to_owned()))
    }
}

/// Branch names with a fixed environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedBranch {
    Main,
    Master,
    Test,
    Int,
}

impl NamedBranch {
    pub fn from_ref(ref_name: &str) -> Option<Self> {
        match ref_name {
            "main" => Some(Self::Main),
            "master" => Some(Self::Master),
            "test" => Some(Self::Test),
            "int" => Some(Self::Int),
            _ => None,
        }
    }

    pub fn environment(self) -> Environment {
        match self {
            Self::Main | Self::Master => Environment::Prod,
            Self::Test => Environment::Test,
            Self::Int => Environment::Int,
        }
    }
}

/// Map a context to its target environment.
///
/// First match wins:
/// 1. tag push → `prod`
/// 2. feature branch → feature namespace
/// 3. `main`/`master` → `prod`, `test` → `test`, `int` → `int`
/// 4. anything else → `dev`
///
/// A tag cut from a feature branch therefore still lands in `prod`.
pub fn route(ctx: &Context) -> Environment {
    if ctx.is_tag {
        return Environment::Prod;
    }
    if ctx.is_feature_branch {
        return Environment::Feature;
    }
    match NamedBranch::from_ref(&ctx.ref_name) {
        Some(branch) => branch.environment(),
        None => Environment::Dev,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::ctx_with;

    #[test]
    fn tag_push_routes_to_prod() {
        let ctx = ctx_with(&[("CI_COMMIT_TAG", "1.2.0"), ("CI_COMMIT_REF_NAME", "1.2.0")]);
        assert_eq!(route(&ctx), Environment::Prod);
    }

    #[test]
    fn tag_beats_feature_branch() {
        let ctx = ctx_with(&[
            ("CI_COMMIT_TAG", "1.2.0"),
            ("CI_COMMIT_REF_NAME", "feature/login"),
        ]);
        assert!(ctx.is_feature_branch);
        assert_eq!(route(&ctx), Environment::Prod);
    }

    #[test]
    fn feature_branch_routes_to_namespace() {
        let ctx = ctx_with(&[("CI_COMMIT_REF_NAME", "feature/login")]);
        assert_eq!(route(&ctx), Environment::Feature);
        assert_eq!(route(&ctx).as_str(), "development");
    }

    #[test]
    fn named_branches() {
        for (branch, env) in [
            ("main", Environment::Prod),
            ("master", Environment::Prod),
            ("test", Environment::Test),
            ("int", Environment::Int),
            ("dev", Environment::Dev),
            ("hotfix-7", Environment::Dev),
        ] {
            let ctx = ctx_with(&[("CI_COMMIT_REF_NAME", branch)]);
            assert_eq!(route(&ctx), env, "branch {branch}");
        }
    }

    #[test]
    fn missing_ref_falls_back_to_dev() {
        let ctx = ctx_with(&[]);
        assert_eq!(route(&ctx), Environment::Dev);
    }

    #[test]
    fn feature_namespace_differs_from_fixed_environments() {
        let fixed = [Environment::Dev, Environment::Test, Environment::Int, Environment::Prod];
        assert!(fixed.iter().all(|e| e.as_str() != Environment::Feature.as_str()));
    }

    #[test]
    fn parses_environment_names() {
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Prod);
        assert_eq!("Development".parse::<Environment>().unwrap(), Environment::Feature);
        assert!("staging".parse::<Environment>().is_err());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn route_is_total(
                ref_name in "[a-z/_.-]{0,20}",
                tag in proptest::option::of("[0-9.]{1,8}"),
            ) {
                let mut vars = vec![("CI_COMMIT_REF_NAME", ref_name.as_str())];
                if let Some(tag) = tag.as_deref() {
                    vars.push(("CI_COMMIT_TAG", tag));
                }
                let ctx = ctx_with(&vars);
                let env = route(&ctx);
                prop_assert!(Environment::ALL.contains(&env));
            }
        }
    }
}
