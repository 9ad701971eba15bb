//! Historical periods of the Tang dynasty, in chronological order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::CatalogError;

/// Number of periods in the catalog.
pub const PERIOD_COUNT: usize = 4;

/// Stable identifier of a period.
///
/// Declaration order is chronological and doubles as the slider order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodId {
    /// 贞观
    Early,
    /// 开元
    High,
    /// 元和
    Mid,
    /// 大顺
    Late,
}

impl PeriodId {
    /// Returns all periods in chronological order.
    pub fn all() -> &'static [PeriodId; PERIOD_COUNT] {
        &[PeriodId::Early, PeriodId::High, PeriodId::Mid, PeriodId::Late]
    }

    /// Position of this period on the time slider.
    pub fn slider_index(&self) -> usize {
        match self {
            PeriodId::Early => 0,
            PeriodId::High => 1,
            PeriodId::Mid => 2,
            PeriodId::Late => 3,
        }
    }

    /// Resolves a slider position to its period.
    pub fn from_slider_index(index: usize) -> Result<PeriodId, CatalogError> {
        Self::all()
            .get(index)
            .copied()
            .ok_or(CatalogError::SliderOutOfRange {
                index,
                max: PERIOD_COUNT,
            })
    }

    /// Wire name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodId::Early => "EARLY",
            PeriodId::High => "HIGH",
            PeriodId::Mid => "MID",
            PeriodId::Late => "LATE",
        }
    }

    /// Returns the catalog entry for this period.
    pub fn config(&self) -> &'static Period {
        &PERIODS[self.slider_index()]
    }
}

impl fmt::Display for PeriodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PeriodId {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CatalogError::UnknownPeriod(s.to_string()))
    }
}

/// Static descriptor of a period: display data plus conditioning text.
#[derive(Debug, PartialEq, Eq)]
pub struct Period {
    pub id: PeriodId,
    pub display_name: &'static str,
    pub year_range_label: &'static str,
    /// Short label shown under the slider notch.
    pub slider_label: &'static str,
    pub background_color: &'static str,
    pub accent_color: &'static str,
    /// Shown on screen and fed to the model as period background.
    pub historical_context: &'static str,
    pub price_text: &'static str,
    pub bulletin_text: &'static str,
    pub report_headline: &'static str,
}

/// Total lookup over the closed period set.
pub fn period_by_id(id: PeriodId) -> &'static Period {
    id.config()
}

static PERIODS: [Period; PERIOD_COUNT] = [
    Period {
        id: PeriodId::Early,
        display_name: "初唐·贞观",
        year_range_label: "公元 627 - 649 年",
        slider_label: "贞观",
        background_color: "#fdf6e3",
        accent_color: "#8b4513",
        historical_context: "太宗励精图治，魏征直言进谏，玄奘法师西行求法，气象万千。",
        price_text: "米斗四钱，绢一匹直钱两百。虽初定天下，民生渐稳。",
        bulletin_text: "圣上纳魏征之言，轻徭薄赋；安西都护府初设，西域商路渐启。",
        report_headline: "《贞观邸报》· 万物始兴",
    },
    Period {
        id: PeriodId::High,
        display_name: "盛唐·开元",
        year_range_label: "公元 713 - 741 年",
        slider_label: "开元",
        background_color: "#f9f3e0",
        accent_color: "#b8860b",
        historical_context: "巅峰盛世，万国来朝。李白斗酒百篇，教坊新奏霓裳羽衣。",
        price_text: "米斗五钱。黄金一两兑钱十贯。长安街头胡姬压酒，春意正浓。",
        bulletin_text: "圣上幸温泉宫，敕命天下节度使入朝朝觐。王维迁监察御史。",
        report_headline: "《开元通报》· 极盛之巅",
    },
    Period {
        id: PeriodId::Mid,
        display_name: "中唐·元和",
        year_range_label: "公元 806 - 820 年",
        slider_label: "元和",
        background_color: "#f2ece0",
        accent_color: "#5d4037",
        historical_context: "安史之乱后，白居易感叹长恨歌。藩镇割据，宪宗虽力求复兴，然大势已变。",
        price_text: "米斗两百钱。战乱频仍，物价渐涨，私钱泛滥。",
        bulletin_text: "宪宗力平藩镇之乱；白居易授江州司马。坊间传闻圣上崇佛求长生。",
        report_headline: "《元和纪实》· 忧患复兴",
    },
    Period {
        id: PeriodId::Late,
        display_name: "晚唐·大顺",
        year_range_label: "公元 890 - 891 年",
        slider_label: "大顺",
        background_color: "#e8e2d0",
        accent_color: "#424242",
        historical_context: "夕阳余晖，李商隐忧郁叹残阳。黄巢之乱后，长安凋零，朱温权倾朝野。",
        price_text: "米斗千钱。战火焚城，金银尽散，民不聊生。",
        bulletin_text: "黄巢之乱余波未平，圣上播迁。长安宫阙半毁。",
        report_headline: "《残唐遗志》· 夕阳余晖",
    },
];
