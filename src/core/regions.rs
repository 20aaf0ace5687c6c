use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub id: &'static str,
    pub name: &'static str,
    /// 1.0 = national average.
    pub cost_index: f64,
}

pub const NATIONAL_AVERAGE_NAME: &str = "全国平均";

const fn region(id: &'static str, name: &'static str, cost_index: f64) -> Region {
    Region {
        id,
        name,
        cost_index,
    }
}

pub const REGIONS: [Region; 47] = [
    region("hokkaido", "北海道", 0.96),
    region("aomori", "青森県", 0.92),
    region("iwate", "岩手県", 0.93),
    region("miyagi", "宮城県", 0.98),
    region("akita", "秋田県", 0.91),
    region("yamagata", "山形県", 0.94),
    region("fukushima", "福島県", 0.94),
    region("ibaraki", "茨城県", 0.97),
    region("tochigi", "栃木県", 0.96),
    region("gunma", "群馬県", 0.95),
    region("saitama", "埼玉県", 1.06),
    region("chiba", "千葉県", 1.05),
    region("tokyo", "東京都", 1.25),
    region("kanagawa", "神奈川県", 1.12),
    region("niigata", "新潟県", 0.95),
    region("toyama", "富山県", 0.96),
    region("ishikawa", "石川県", 0.97),
    region("fukui", "福井県", 0.95),
    region("yamanashi", "山梨県", 0.96),
    region("nagano", "長野県", 0.95),
    region("gifu", "岐阜県", 0.96),
    region("shizuoka", "静岡県", 0.99),
    region("aichi", "愛知県", 1.04),
    region("mie", "三重県", 0.97),
    region("shiga", "滋賀県", 0.99),
    region("kyoto", "京都府", 1.04),
    region("osaka", "大阪府", 1.07),
    region("hyogo", "兵庫県", 1.03),
    region("nara", "奈良県", 0.98),
    region("wakayama", "和歌山県", 0.94),
    region("tottori", "鳥取県", 0.93),
    region("shimane", "島根県", 0.93),
    region("okayama", "岡山県", 0.96),
    region("hiroshima", "広島県", 0.99),
    region("yamaguchi", "山口県", 0.94),
    region("tokushima", "徳島県", 0.94),
    region("kagawa", "香川県", 0.95),
    region("ehime", "愛媛県", 0.93),
    region("kochi", "高知県", 0.93),
    region("fukuoka", "福岡県", 1.00),
    region("saga", "佐賀県", 0.92),
    region("nagasaki", "長崎県", 0.93),
    region("kumamoto", "熊本県", 0.95),
    region("oita", "大分県", 0.93),
    region("miyazaki", "宮崎県", 0.91),
    region("kagoshima", "鹿児島県", 0.92),
    region("okinawa", "沖縄県", 0.97),
];

pub fn find_region(id: &str) -> Option<&'static Region> {
    REGIONS.iter().find(|r| r.id == id)
}

/// Unknown ids resolve to the national average (1.0).
pub fn cost_index(id: &str) -> f64 {
    find_region(id).map(|r| r.cost_index).unwrap_or(1.0)
}

pub fn region_name(id: &str) -> &'static str {
    find_region(id)
        .map(|r| r.name)
        .unwrap_or(NATIONAL_AVERAGE_NAME)
}
