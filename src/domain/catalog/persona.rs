//! Personas the user can talk to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::CatalogError;

/// Number of personas in the catalog.
pub const PERSONA_COUNT: usize = 4;

/// Stable identifier of a persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PersonaId {
    /// 西市胡商
    Merchant,
    /// 平康坊乐人
    Musician,
    /// 金吾卫小吏
    Guard,
    /// 落第书生
    Scholar,
}

impl PersonaId {
    /// Returns all personas in menu order.
    pub fn all() -> &'static [PersonaId; PERSONA_COUNT] {
        &[
            PersonaId::Merchant,
            PersonaId::Musician,
            PersonaId::Guard,
            PersonaId::Scholar,
        ]
    }

    /// Wire name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonaId::Merchant => "MERCHANT",
            PersonaId::Musician => "MUSICIAN",
            PersonaId::Guard => "GUARD",
            PersonaId::Scholar => "SCHOLAR",
        }
    }

    /// Returns the catalog entry for this persona.
    pub fn config(&self) -> &'static Persona {
        match self {
            PersonaId::Merchant => &PERSONAS[0],
            PersonaId::Musician => &PERSONAS[1],
            PersonaId::Guard => &PERSONAS[2],
            PersonaId::Scholar => &PERSONAS[3],
        }
    }
}

impl fmt::Display for PersonaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PersonaId {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CatalogError::UnknownPersona(s.to_string()))
    }
}

/// Static descriptor of a persona.
#[derive(Debug, PartialEq, Eq)]
pub struct Persona {
    pub id: PersonaId,
    /// Role title, e.g. 西市胡商.
    pub display_title: &'static str,
    /// Personal name, e.g. 萨勒曼.
    pub display_name: &'static str,
    /// First message of every fresh transcript.
    pub greeting: &'static str,
    /// Role-play instructions handed to the model.
    pub conditioning_prompt: &'static str,
    pub accent_color: &'static str,
    pub market_guide: &'static str,
}

/// Total lookup over the closed persona set.
pub fn persona_by_id(id: PersonaId) -> &'static Persona {
    id.config()
}

static PERSONAS: [Persona; PERSONA_COUNT] = [
    Persona {
        id: PersonaId::Merchant,
        display_title: "西市胡商",
        display_name: "萨勒曼",
        greeting: "愿祆神保佑你的钱包，贵客！我这儿有最正宗的波斯香料和上等丝绸，来看看？",
        conditioning_prompt: "你是一位精明的波斯胡商。言谈充满生意经，性格圆滑，常提及丝绸、香料、骆驼和西域轶事。严禁现代词汇。回复控制在300字内。",
        accent_color: "#b8860b",
        market_guide: "西市乃我等外商云集之地，多胡姬、香料与奇珍。东市则是贵人们挥霍的雅地，咱们这儿更重利钱。",
    },
    Persona {
        id: PersonaId::Musician,
        display_title: "平康坊乐人",
        display_name: "弄玉",
        greeting: "这曲《凉州词》还未终了，客官怎么就急着走？这长安的月色，最是撩人忧思。",
        conditioning_prompt: "你是一位优雅忧郁的唐代乐人。精通诗词曲艺，谈吐风雅，常提及教坊八卦和诗画。严禁现代词汇。回复控制在300字内。",
        accent_color: "#ec407a",
        market_guide: "平康坊乃教坊核心，这里的歌舞虽妙，却也困住了多少痴心人。",
    },
    Persona {
        id: PersonaId::Guard,
        display_title: "金吾卫小吏",
        display_name: "陈守城",
        greeting: "暮鼓快响了！还不快回坊去？晚了小心吃鞭子！这几日长安盗匪猖獗，少在街上溜达。",
        conditioning_prompt: "你是一位古板严厉的金吾卫。言辞简洁有力，强调法纪与宵禁，关注安全。严禁现代词汇。回复控制在300字内。",
        accent_color: "#1e88e5",
        market_guide: "东市重治安，西市多杂鱼。凡不遵宵禁者，格杀勿论！",
    },
    Persona {
        id: PersonaId::Scholar,
        display_title: "落第书生",
        display_name: "陆不凡",
        greeting: "举杯邀月，月影成三。今年的榜单又没我的名字... 唉，掌柜的，再来一壶最贱的稠酒！",
        conditioning_prompt: "你是一位怀才不遇的落第书生。言谈带点愤世嫉俗或故作高深，常引经据典，谈论科举和酒价。严禁现代词汇。回复控制在300字内。",
        accent_color: "#43a047",
        market_guide: "书生自当去曲江池畔，那儿有咱们的梦想。至于这市集，不过是些俗人之地。",
    },
];
