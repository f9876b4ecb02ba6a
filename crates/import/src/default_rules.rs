//! Built-in rule table tuned for South African merchants and amounts (ZAR).
//!
//! Order matters: ties go to the earlier rule.

use crate::rules::CategoryRule;

pub fn default_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new("Groceries", 0.92)
            .with_patterns(&[
                r"woolworths|ww\s|pick.*pay|checkers|spar|shoprite|ok.*foods|food.*lover|fruit.*veg",
                r"grocery|supermarket|market|food.*store",
            ])
            .with_keywords(&["grocery", "food", "supermarket", "fresh", "produce"])
            .with_amount_range(Some(50.0), Some(500.0), 0.05)
            .with_amount_range(Some(500.0), Some(1500.0), 0.03),
        CategoryRule::new("Transport", 0.88)
            .with_patterns(&[
                r"uber|bolt|taxify|lyft|ride.*share|e.*hailing",
                r"taxi|transport|metro|gautrain|bus",
            ])
            .with_keywords(&["ride", "trip", "transport", "travel", "journey"])
            .with_amount_range(Some(15.0), Some(200.0), 0.08),
        // Fuel
        CategoryRule::new("Transport", 0.94)
            .with_patterns(&[
                r"shell|bp|engen|sasol|caltex|total",
                r"petrol|fuel|gas.*station|service.*station",
            ])
            .with_keywords(&["fuel", "petrol", "diesel", "gas"])
            .with_amount_range(Some(300.0), Some(1200.0), 0.06),
        CategoryRule::new("Shopping", 0.85)
            .with_patterns(&[
                r"takealot|amazon|online.*shop|shop.*online|konga|bid.*buy",
                r"e.*commerce|web.*store|digital.*store",
            ])
            .with_keywords(&["online", "delivery", "purchase", "order"]),
        CategoryRule::new("Food & Dining", 0.89)
            .with_patterns(&[
                r"restaurant|mcdonald|kfc|steers|nando|wimpy|spur|ocean.*basket",
                r"dining|eatery|cafe|coffee.*shop|bistro|grill",
            ])
            .with_keywords(&["meal", "dining", "restaurant", "food", "eat"])
            .with_amount_range(Some(80.0), Some(400.0), 0.07),
        CategoryRule::new("Income", 0.96)
            .with_patterns(&[
                r"salary|payroll|income|wage|bonus|commission",
                r"payment.*received|deposit.*salary|emp.*payment",
            ])
            .with_keywords(&["salary", "wage", "income", "payment", "earnings"]),
        CategoryRule::new("Housing", 0.93)
            .with_patterns(&[
                r"rent|rental|lease|mortgage|bond.*payment|property.*payment",
                r"housing|accommodation|residential",
            ])
            .with_keywords(&["rent", "property", "housing", "home", "apartment"])
            .with_amount_range(Some(5000.0), Some(25000.0), 0.05),
        CategoryRule::new("Healthcare", 0.91)
            .with_patterns(&[
                r"medical.*aid|discovery.*health|momentum.*health|gems|bestmed|bonitas",
                r"health.*insurance|medical.*scheme|clinic|hospital|pharmacy",
            ])
            .with_keywords(&["medical", "health", "clinic", "pharmacy", "doctor"])
            .with_amount_range(Some(1000.0), Some(5000.0), 0.04),
        // Interest and investment returns
        CategoryRule::new("Income", 0.97)
            .with_patterns(&[
                r"interest.*payment|bank.*interest|investment.*return|dividend",
                r"savings.*interest|fixed.*deposit.*interest",
            ])
            .with_keywords(&["interest", "dividend", "return", "investment"]),
        CategoryRule::new("Banking Fees", 0.95)
            .with_patterns(&[
                r"absa.*fee|fnb.*fee|standard.*bank.*fee|nedbank.*fee|capitec.*fee",
                r"bank.*charge|account.*fee|service.*fee|atm.*fee|card.*fee",
            ])
            .with_keywords(&["fee", "charge", "service", "bank", "account"])
            .with_amount_range(Some(5.0), Some(100.0), 0.08),
        CategoryRule::new("Insurance", 0.90)
            .with_patterns(&[
                r"insurance|life.*cover|car.*insurance|home.*insurance|short.*term",
                r"assurance|cover|premium|policy",
            ])
            .with_keywords(&["insurance", "premium", "cover", "policy"])
            .with_amount_range(Some(500.0), Some(3000.0), 0.05),
        CategoryRule::new("Utilities", 0.92)
            .with_patterns(&[
                r"utility|electricity|water.*bill|municipal|city.*council",
                r"eskom|prepaid.*electricity|rates.*taxes",
            ])
            .with_keywords(&["electricity", "water", "municipal", "utility"])
            .with_amount_range(Some(500.0), Some(2500.0), 0.06),
        CategoryRule::new("Communications", 0.89)
            .with_patterns(&[
                r"telkom|vodacom|mtn|cell.*c|rain|webafrica",
                r"internet|wifi|data|cellular|mobile.*data",
            ])
            .with_keywords(&["internet", "mobile", "data", "cellular"])
            .with_amount_range(Some(200.0), Some(1000.0), 0.06),
        CategoryRule::new("Entertainment", 0.87)
            .with_patterns(&[
                r"netflix|showmax|dstv|multichoice|amazon.*prime|spotify",
                r"subscription|streaming|entertainment|music.*service",
            ])
            .with_keywords(&["subscription", "streaming", "entertainment", "music"])
            .with_amount_range(Some(50.0), Some(500.0), 0.07),
    ]
}
