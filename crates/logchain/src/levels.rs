//! Level table installation and per-level convenience calls.
//!
//! A node exposes exactly the levels of its installed table: `node.level(name)`
//! hands out a [`LevelMethod`] only for installed names, and the fixed npm
//! shortcuts (`node.info(..)` and friends) fail with
//! [`ChainError::LevelNotInstalled`] once their level has been replaced away.

use crate::error::{ChainError, Result};
use crate::node::Node;
use logchain_core::{LevelTable, Metadata};
use std::sync::PoisonError;
use tracing::debug;

/// A callable bound to one installed level of one node
#[derive(Debug, Clone)]
pub struct LevelMethod<'a> {
    node: &'a Node,
    level: String,
}

impl<'a> LevelMethod<'a> {
    pub fn name(&self) -> &str {
        &self.level
    }

    /// Log `message` at this level
    pub fn call(&self, message: impl Into<String>) -> Result<()> {
        self.node.log(&self.level, message)
    }

    /// Log `message` with metadata at this level
    pub fn call_with(&self, message: impl Into<String>, metadata: Metadata) -> Result<()> {
        self.node.log_with(&self.level, message, metadata)
    }
}

impl Node {
    /// Replace the installed level table
    ///
    /// This is a full replace: levels absent from `levels` stop being
    /// callable. The table is pushed to the sink as well so its filtering
    /// stays in sync.
    pub fn set_levels(&self, levels: LevelTable) {
        debug!(tag = %self.tag(), levels = ?levels.names(), "Installing level table");
        {
            let mut installed = self
                .inner
                .levels
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            *installed = levels.clone();
        }
        self.inner.sink.set_levels(levels);
    }

    /// The convenience method for `level`, if that level is installed
    pub fn level(&self, level: &str) -> Option<LevelMethod<'_>> {
        let installed = self
            .inner
            .levels
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        installed.contains(level).then(|| LevelMethod {
            node: self,
            level: level.to_string(),
        })
    }

    /// Every installed convenience method, most severe first
    pub fn level_methods(&self) -> Vec<LevelMethod<'_>> {
        self.levels()
            .names()
            .into_iter()
            .map(|level| LevelMethod {
                node: self,
                level: level.to_string(),
            })
            .collect()
    }

    fn call_level(&self, level: &str, message: String, metadata: Metadata) -> Result<()> {
        let method = self.level(level).ok_or_else(|| ChainError::LevelNotInstalled {
            tag: self.tag().to_string(),
            level: level.to_string(),
        })?;
        method.call_with(message, metadata)
    }
}

macro_rules! level_shortcuts {
    ($($level:ident, $with:ident);* $(;)?) => {
        impl Node {
            $(
                #[doc = concat!("Log at `", stringify!($level), "` here and at every attached node")]
                pub fn $level(&self, message: impl Into<String>) -> Result<()> {
                    self.call_level(stringify!($level), message.into(), Metadata::new())
                }

                #[doc = concat!("Log at `", stringify!($level), "` with metadata")]
                pub fn $with(&self, message: impl Into<String>, metadata: Metadata) -> Result<()> {
                    self.call_level(stringify!($level), message.into(), metadata)
                }
            )*
        }
    };
}

level_shortcuts! {
    error, error_with;
    warn, warn_with;
    info, info_with;
    http, http_with;
    verbose, verbose_with;
    debug, debug_with;
    silly, silly_with;
}
