use crate::types::AcField;

pub const TOPIC_SENSOR: &str = "home/living/ac/sensor";
pub const TOPIC_LOG: &str = "home/living/ac/log";
pub const TOPIC_AC_STATE: &str = "home/living/ac/get";

pub const TOPIC_CMD_POWER: &str = "home/living/ac/power/set";
pub const TOPIC_CMD_MODE: &str = "home/living/ac/mode/set";
pub const TOPIC_CMD_TEMP: &str = "home/living/ac/temp/set";
pub const TOPIC_CMD_FAN: &str = "home/living/ac/fan/set";
pub const TOPIC_CMD_SWING: &str = "home/living/ac/swing/set";

pub const COMMAND_TOPICS: [&str; 5] = [
    TOPIC_CMD_POWER,
    TOPIC_CMD_MODE,
    TOPIC_CMD_TEMP,
    TOPIC_CMD_FAN,
    TOPIC_CMD_SWING,
];

pub fn command_field(topic: &str) -> Option<AcField> {
    match topic {
        TOPIC_CMD_POWER => Some(AcField::Power),
        TOPIC_CMD_MODE => Some(AcField::Mode),
        TOPIC_CMD_TEMP => Some(AcField::TargetTemp),
        TOPIC_CMD_FAN => Some(AcField::Fan),
        TOPIC_CMD_SWING => Some(AcField::Swing),
        _ => None,
    }
}
