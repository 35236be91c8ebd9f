//! Built-in profiles and option catalogue.

use super::registry::{OptionSpec, Profile, PAYLOAD_TYPE};

const COMMON_DEFAULTS: &[(&str, &str)] = &[
    ("callback_delay", "0"),
    ("build_mode", "debug"),
    ("output_path", "./output/"),
];

/// Profiles shipped with the shell
pub fn profiles() -> Vec<Profile> {
    let mut reverse_shell = Profile::new(
        "reverse_shell",
        &["ip", "port", "platform", "language"],
        &["persistence", "encryption", "polymorphism", "watermark"],
        &[
            ("persistence", "none"),
            ("encryption", "none"),
            ("polymorphism", "none"),
            ("watermark", "none"),
        ],
    );
    let mut downloader = Profile::new(
        "downloader",
        &["platform", "language", "download_url"],
        &["persistence", "polymorphism", "execute_after_download"],
        &[
            ("persistence", "none"),
            ("polymorphism", "none"),
            ("execute_after_download", "true"),
        ],
    );

    for profile in [&mut reverse_shell, &mut downloader] {
        for (k, v) in COMMON_DEFAULTS {
            profile.defaults.insert(k.to_string(), v.to_string());
        }
    }

    vec![reverse_shell, downloader]
}

/// Option catalogue shared by the built-in profiles
pub fn options() -> Vec<OptionSpec> {
    vec![
        OptionSpec::free_text(
            PAYLOAD_TYPE,
            "Kind of payload to generate (reverse shell, downloader, ...).",
        ),
        OptionSpec::enumerated(
            "language",
            "Source language for the generated payload.",
            &[("python", "Python 3 script"), ("bash", "POSIX shell script")],
        ),
        OptionSpec::enumerated(
            "platform",
            "Target operating system.",
            &[("macos", "Apple macOS"), ("linux", "Linux distributions")],
        ),
        OptionSpec::free_text("ip", "Listener IP for reverse connections."),
        OptionSpec::free_text("port", "Listener port."),
        OptionSpec::free_text("callback_delay", "Delay (s) between callbacks/beacons."),
        OptionSpec::enumerated(
            "persistence",
            "Persistence mechanism on target.",
            &[
                ("none", "No persistence"),
                ("mac_launch_agent", "Register a per-user launch agent"),
            ],
        ),
        OptionSpec::enumerated(
            "encryption",
            "Encoding applied to the payload body.",
            &[("none", "Plain output"), ("xor", "Single-key XOR encoding")],
        ),
        OptionSpec::enumerated(
            "polymorphism",
            "Source transformations applied on each build.",
            &[
                ("none", "No transformation"),
                ("obfuscate_vars", "Rename identifiers on every build"),
            ],
        ),
        OptionSpec::free_text("watermark", "Identifier embedded in the build manifest."),
        OptionSpec::free_text("download_url", "URL the downloader fetches."),
        OptionSpec::enumerated(
            "execute_after_download",
            "Run the fetched file once downloaded.",
            &[("true", "Execute after download"), ("false", "Only save the file")],
        ),
        OptionSpec::free_text("output_path", "Folder for generated output (default ./output/)."),
        OptionSpec::free_text("filename", "Output filename (no extension)."),
        OptionSpec::enumerated(
            "build_mode",
            "debug / release / dry-run.",
            &[
                ("debug", "Keep diagnostics in the output"),
                ("release", "Strip diagnostics"),
                ("dry-run", "Validate and summarize without writing output"),
            ],
        ),
    ]
}
