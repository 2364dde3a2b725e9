//! Command words understood by the sensor.
//!
//! Configuration commands must be bracketed by `EnableConfig` and
//! `EndConfig`; the module ignores them otherwise.

/// A known 16-bit command word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum CommandWord {
    /// Enter configuration mode. Data: `01 00`.
    EnableConfig = 0x00FF,
    /// Leave configuration mode.
    EndConfig = 0x00FE,
    /// Max moving gate, max resting gate, no-one duration.
    MaxDistanceGate = 0x0060,
    ReadParameter = 0x0061,
    EnableEngineering = 0x0062,
    CloseEngineering = 0x0063,
    /// Distance gate, motion sensitivity, static sensitivity.
    SetSensitivity = 0x0064,
    ReadFirmwareVersion = 0x00A0,
    /// Data: baud rate selection index.
    SetBaudRate = 0x00A1,
    FactoryReset = 0x00A2,
    Restart = 0x00A3,
}

impl CommandWord {
    /// Every known command word, in table order.
    pub const ALL: [CommandWord; 11] = [
        CommandWord::EnableConfig,
        CommandWord::EndConfig,
        CommandWord::MaxDistanceGate,
        CommandWord::ReadParameter,
        CommandWord::EnableEngineering,
        CommandWord::CloseEngineering,
        CommandWord::SetSensitivity,
        CommandWord::ReadFirmwareVersion,
        CommandWord::SetBaudRate,
        CommandWord::FactoryReset,
        CommandWord::Restart,
    ];

    pub const fn word(self) -> u16 {
        self as u16
    }

    /// Kebab-case name used on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            CommandWord::EnableConfig => "enable-config",
            CommandWord::EndConfig => "end-config",
            CommandWord::MaxDistanceGate => "max-distance-gate",
            CommandWord::ReadParameter => "read-parameter",
            CommandWord::EnableEngineering => "enable-engineering",
            CommandWord::CloseEngineering => "close-engineering",
            CommandWord::SetSensitivity => "set-sensitivity",
            CommandWord::ReadFirmwareVersion => "read-firmware-version",
            CommandWord::SetBaudRate => "set-baud-rate",
            CommandWord::FactoryReset => "factory-reset",
            CommandWord::Restart => "restart",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|cmd| cmd.name() == name)
    }
}

impl TryFrom<u16> for CommandWord {
    type Error = u16;

    fn try_from(word: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|cmd| cmd.word() == word)
            .ok_or(word)
    }
}

impl From<CommandWord> for u16 {
    fn from(cmd: CommandWord) -> Self {
        cmd.word()
    }
}

/// Returns a human-readable name for a raw command word.
pub fn command_name(word: u16) -> &'static str {
    CommandWord::try_from(word)
        .map(CommandWord::name)
        .unwrap_or("UNKNOWN")
}
