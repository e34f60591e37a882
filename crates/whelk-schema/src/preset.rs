#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub descriptor: &'static str,
}

pub const BUILTIN_PRESETS: &[Preset] = &[
    Preset {
        name: "minimal",
        description: "Empty environment with no extra packages",
        descriptor: r#"descriptor_version = 1

[shell]
name = "minimal"
"#,
    },
    Preset {
        name: "hello",
        description: "Banner demo: figlet greeting on entry",
        descriptor: r#"descriptor_version = 1

[shell]
name = "hello"
packages = ["figlet"]
hook = "figlet \"$MESSAGE\""

[env]
MESSAGE = "Hello"
"#,
    },
    Preset {
        name: "dev",
        description: "Development environment with common build tools",
        descriptor: r#"descriptor_version = 1

[shell]
name = "dev"
packages = ["git", "curl", "wget", "vim", "gcc", "make", "cmake"]
"#,
    },
    Preset {
        name: "dev-rust",
        description: "Rust development environment",
        descriptor: r#"descriptor_version = 1

[shell]
name = "dev-rust"
packages = ["git", "curl", "gcc", "make", "rustup"]

[env]
CARGO_HOME = ".cargo"
"#,
    },
    Preset {
        name: "dev-python",
        description: "Python development environment with a clean installer timestamp",
        descriptor: r#"descriptor_version = 1

unset = ["SOURCE_DATE_EPOCH"]

[shell]
name = "dev-python"
packages = ["git", "curl", "python3", "python3-pip", "python3-venv"]
"#,
    },
];

pub fn get_preset(name: &str) -> Option<&'static Preset> {
    BUILTIN_PRESETS.iter().find(|p| p.name == name)
}

pub fn list_presets() -> &'static [Preset] {
    BUILTIN_PRESETS
}
