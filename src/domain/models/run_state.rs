// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::fmt;
use thiserror::Error;

use crate::utils::errors::RunErrorKind;

/// 运行状态
///
/// 线性状态机：
/// NotStarted → ToolChecked → ProcessRan → OutputLocated → Published
/// 任何非终止状态都可以进入 Failed，状态不会被重复进入。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    NotStarted,
    ToolChecked,
    ProcessRan,
    OutputLocated,
    Published,
    Failed(RunErrorKind),
}

/// 无效的状态转换
#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid run state transition from {from} to {to}")]
pub struct InvalidTransition {
    pub from: RunState,
    pub to: RunState,
}

impl RunState {
    /// 线性流程中的下一个状态，终止状态返回 None
    pub fn successor(&self) -> Option<RunState> {
        match self {
            RunState::NotStarted => Some(RunState::ToolChecked),
            RunState::ToolChecked => Some(RunState::ProcessRan),
            RunState::ProcessRan => Some(RunState::OutputLocated),
            RunState::OutputLocated => Some(RunState::Published),
            RunState::Published | RunState::Failed(_) => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Published | RunState::Failed(_))
    }

    /// 转换到指定状态
    ///
    /// 只允许前进到线性流程中的下一个状态，或从非终止状态进入 Failed。
    pub fn advance(self, to: RunState) -> Result<RunState, InvalidTransition> {
        let allowed = match to {
            RunState::Failed(_) => !self.is_terminal(),
            next => self.successor() == Some(next),
        };
        if allowed {
            Ok(to)
        } else {
            Err(InvalidTransition { from: self, to })
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RunState::NotStarted => write!(f, "not_started"),
            RunState::ToolChecked => write!(f, "tool_checked"),
            RunState::ProcessRan => write!(f, "process_ran"),
            RunState::OutputLocated => write!(f, "output_located"),
            RunState::Published => write!(f, "published"),
            RunState::Failed(kind) => write!(f, "failed({})", kind),
        }
    }
}
