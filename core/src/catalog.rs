//! Receiver catalog: the merchants, charities and high-value targets
//! that transactions are addressed to.
//!
//! The lists are static data. Charities and high-value targets are
//! subsets of the full catalog, so a normal transaction may land on
//! either.

use crate::rng::RandomSource;

/// Which slice of the catalog a draw comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverClass {
    /// The full catalog. Used for normal traffic and micro-drips.
    General,
    /// Charities and non-profits. Drip target of the charity scenario.
    Charity,
    /// Electronics, office and online retail. Large-purchase target.
    HighValueTarget,
}

impl ReceiverClass {
    pub fn receivers(&self) -> &'static [&'static str] {
        match self {
            Self::General         => ALL_RECEIVERS,
            Self::Charity         => CHARITY_RECEIVERS,
            Self::HighValueTarget => HIGH_VALUE_TARGETS,
        }
    }

    /// Draw one receiver of this class uniformly.
    pub fn pick(&self, rng: &mut impl RandomSource) -> &'static str {
        *rng.pick(self.receivers())
    }
}

pub const ALL_RECEIVERS: &[&str] = &[
    // Retail (General)
    "Walmart", "Target", "Costco Wholesale", "Kmart", "Meijer", "Kroger", "Publix", "Safeway",
    "Albertsons", "Whole Foods Market", "Trader Joe's", "Aldi", "Lidl", "Wegmans", "H-E-B",
    "Stop & Shop", "Giant Food", "Food Lion", "Winn-Dixie", "Piggly Wiggly", "Sprouts Farmers Market",
    // Retail (Hardware/Home)
    "The Home Depot", "Lowe's", "Ace Hardware", "True Value", "Menards", "Harbor Freight Tools",
    "Tractor Supply Co.", "Bed Bath & Beyond", "IKEA", "Crate & Barrel", "Williams-Sonoma",
    "Pottery Barn", "Restoration Hardware", "At Home", "Floor & Decor",
    // Retail (Electronics/Office)
    "Best Buy", "Micro Center", "Apple Store", "Microsoft Store", "GameStop", "Staples",
    "Office Depot", "OfficeMax", "CDW", "Newegg.com",
    // Retail (Apparel)
    "Macy's", "Nordstrom", "Dillard's", "Kohl's", "JCPenney", "Saks Fifth Avenue", "Neiman Marcus",
    "Bloomingdale's", "Gap", "Old Navy", "Banana Republic", "J.Crew", "H&M", "Zara", "Uniqlo",
    "Forever 21", "American Eagle Outfitters", "Abercrombie & Fitch", "Hollister Co.", "Lululemon",
    "Nike", "Adidas", "Puma", "Under Armour", "Reebok", "Dick's Sporting Goods", "Academy Sports + Outdoors",
    "REI", "Cabela's", "Bass Pro Shops", "Foot Locker", "Victoria's Secret", "Bath & Body Works",
    "The Children's Place", "Carter's",
    // Retail (Pharmacies)
    "CVS Pharmacy", "Walgreens", "Rite Aid", "GoodRx",
    // Retail (Discount)
    "Dollar General", "Dollar Tree", "Family Dollar", "Five Below", "Big Lots", "Ollie's Bargain Outlet",
    // Retail (Online)
    "Amazon.com", "eBay", "Etsy", "Wayfair", "Overstock.com", "Zappos", "Chewy", "Wish.com",
    // Restaurants (Fast Food)
    "McDonald's", "Burger King", "Wendy's", "Taco Bell", "Chick-fil-A", "Subway", "KFC",
    "Popeyes", "Arby's", "Jack in the Box", "Sonic Drive-In", "Whataburger", "In-N-Out Burger",
    "Five Guys", "Shake Shack", "Pizza Hut", "Domino's", "Papa John's", "Little Caesars",
    "Panda Express", "Chipotle Mexican Grill", "Qdoba", "Moe's Southwest Grill", "Del Taco",
    // Restaurants (Casual/Coffee)
    "Starbucks", "Dunkin'", "Panera Bread", "Tim Hortons", "Peet's Coffee", "The Coffee Bean & Tea Leaf",
    "Applebee's", "Chili's Grill & Bar", "TGI Fridays", "Olive Garden", "Red Lobster", "Outback Steakhouse",
    "Texas Roadhouse", "LongHorn Steakhouse", "The Cheesecake Factory", "Red Robin", "Buffalo Wild Wings",
    "Denny's", "IHOP", "Cracker Barrel", "Waffle House", "P.F. Chang's",
    // Tech & Services
    "Google", "Microsoft", "Apple Inc.", "Meta Platforms", "Amazon Web Services", "Netflix", "Spotify",
    "Hulu", "Disney+", "Salesforce", "Oracle", "IBM", "Intel", "AMD", "Nvidia", "Dell Technologies",
    "HP Inc.", "Cisco Systems", "Adobe", "Zoom Video", "Uber", "Lyft", "DoorDash", "Grubhub",
    "Instacart", "Airbnb", "PayPal", "Block (Square)", "Stripe", "Shopify", "GoDaddy", "Intuit",
    "Dropbox", "Slack", "X (Twitter)",
    // Travel & Auto
    "Delta Air Lines", "American Airlines", "United Airlines", "Southwest Airlines", "JetBlue",
    "Alaska Airlines", "Spirit Airlines", "Frontier Airlines", "Marriott International", "Hilton",
    "Hyatt Hotels", "IHG Hotels & Resorts", "Wyndham Hotels", "Choice Hotels", "Best Western",
    "Expedia", "Booking.com", "Enterprise Rent-A-Car", "Hertz", "Avis", "Budget", "AutoZone",
    "O'Reilly Auto Parts", "Advance Auto Parts", "NAPA Auto Parts", "Pep Boys",
    // Charities & Non-Profits
    "American Red Cross", "Doctors Without Borders", "UNICEF", "Habitat for Humanity",
    "St. Jude Children's Research Hospital", "The Humane Society", "WWF (World Wildlife Fund)",
    "Sierra Club", "The Nature Conservancy", "Feeding America", "Goodwill Industries",
    "The Salvation Army", "United Way", "Boys & Girls Clubs of America", "Make-A-Wish Foundation",
    "Susan G. Komen", "American Cancer Society", "American Heart Association", "Save the Children",
    "Shriners Hospitals for Children", "Wounded Warrior Project", "ASPCA", "Charity: Water",
    // Utilities & Telecom
    "AT&T", "Verizon", "T-Mobile", "Comcast (Xfinity)", "Charter (Spectrum)", "Cox Communications",
    "Duke Energy", "NextEra Energy", "Southern Company", "Dominion Energy", "Exelon",
    "Pacific Gas and Electric (PG&E)", "Con Edison",
    // Finance & Insurance
    "Bank of America", "JPMorgan Chase", "Wells Fargo", "Citigroup", "Goldman Sachs", "Morgan Stanley",
    "U.S. Bank", "PNC", "Capital One", "American Express", "Visa", "Mastercard", "Discover",
    "Geico", "Progressive", "State Farm", "Allstate", "Liberty Mutual",
    // Miscellaneous
    "7-Eleven", "Circle K", "Shell", "ExxonMobil", "BP", "Chevron", "Marathon Petroleum",
    "Sheetz", "Wawa", "The LEGO Group", "Mattel", "Hasbro", "The Walt Disney Company",
    "Paramount", "Warner Bros.", "Sony Pictures", "Universal Pictures",
];

pub const CHARITY_RECEIVERS: &[&str] = &[
    "American Red Cross", "Doctors Without Borders", "UNICEF", "Habitat for Humanity",
    "St. Jude Children's Research Hospital", "The Humane Society", "WWF (World Wildlife Fund)",
    "Sierra Club", "The Nature Conservancy", "Feeding America", "Goodwill Industries",
    "The Salvation Army", "United Way", "Boys & Girls Clubs of America", "Make-A-Wish Foundation",
    "Susan G. Komen", "American Cancer Society", "American Heart Association", "Save the Children",
    "Shriners Hospitals for Children", "Wounded Warrior Project", "ASPCA", "Charity: Water",
];

pub const HIGH_VALUE_TARGETS: &[&str] = &[
    // Electronics / office
    "Best Buy", "Micro Center", "Apple Store", "Microsoft Store", "GameStop", "Staples",
    "Office Depot", "OfficeMax", "CDW", "Newegg.com",
    // Online
    "Amazon.com", "eBay", "Etsy", "Wayfair", "Overstock.com", "Zappos", "Chewy", "Wish.com",
];
