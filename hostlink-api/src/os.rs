//! Facts about the host operating system.

use serde::{Deserialize, Serialize};

use hostlink_core::command;

use crate::client::HostClient;
use crate::Result;

fn cmd(action: &str) -> String {
    command::plugin("os", action)
}

/// Operating system the host reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Darwin,
    Ios,
    Freebsd,
    Dragonfly,
    Netbsd,
    Openbsd,
    Solaris,
    Android,
    Win32,
}

/// CPU architecture of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    X86,
    X86_64,
    Arm,
    Aarch64,
    Mips,
    Mips64,
    Powerpc,
    Powerpc64,
    Riscv64,
    S390x,
    Sparc64,
}

/// Broad OS family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Unix,
    Windows,
}

pub async fn platform(client: &HostClient) -> Result<Platform> {
    client.call(&cmd("platform"), ()).await
}

pub async fn arch(client: &HostClient) -> Result<Arch> {
    client.call(&cmd("arch"), ()).await
}

pub async fn family(client: &HostClient) -> Result<Family> {
    client.call(&cmd("family"), ()).await
}

/// Kernel or OS version string, as the host formats it.
pub async fn version(client: &HostClient) -> Result<String> {
    client.call(&cmd("version"), ()).await
}

/// BCP-47 locale, when the host knows one.
pub async fn locale(client: &HostClient) -> Result<Option<String>> {
    client.call(&cmd("locale"), ()).await
}

pub async fn hostname(client: &HostClient) -> Result<String> {
    client.call(&cmd("hostname"), ()).await
}
