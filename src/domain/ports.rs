use crate::domain::model::Invocation;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// 外部行程的抽象；測試以記錄用的假實作替換
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// 在 PATH 上尋找命令，找不到回傳 None
    fn locate(&self, program: &str) -> Option<PathBuf>;

    /// 執行並等待結束，回傳退出碼
    async fn run(&self, invocation: &Invocation) -> Result<i32>;
}

pub trait Console: Send + Sync {
    fn status(&self, line: &str);
    fn error(&self, line: &str);
    /// 印出提示後等待一行輸入
    fn pause(&self, prompt: &str);
}

pub trait PortProbe: Send + Sync {
    fn is_in_use(&self, port: u16) -> bool;
}
