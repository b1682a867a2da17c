//! Demo data command handler

use chrono::{Duration, Local, NaiveTime};
use tracing::info;

use crate::config::Config;
use crate::db::{NewFood, NewShop, NewUser, Store};
use crate::entities::Role;

const DEMO_PASSWORD: &str = "password";
const ADMIN_EMAIL: &str = "admin@example.com";

struct DemoShop {
    owner: &'static str,
    email: &'static str,
    phone: &'static str,
    name: &'static str,
    address: &'static str,
    latitude: f64,
    longitude: f64,
    hours: (&'static str, &'static str),
    rating: f64,
}

struct DemoFood {
    /// Index into `SHOPS`.
    shop: usize,
    name: &'static str,
    category: &'static str,
    quantity: i32,
    expires_in_hours: i64,
    description: &'static str,
}

const SHOPS: &[DemoShop] = &[
    DemoShop {
        owner: "Manager A",
        email: "shop1@example.com",
        phone: "02-1234-5678",
        name: "Happy Market - Xinyi",
        address: "No. 7, Sec. 5, Xinyi Rd., Xinyi Dist., Taipei",
        latitude: 25.0330,
        longitude: 121.5654,
        hours: ("09:00", "22:00"),
        rating: 4.5,
    },
    DemoShop {
        owner: "Manager B",
        email: "shop2@example.com",
        phone: "02-8765-4321",
        name: "Kindness Bakery",
        address: "No. 11, Songgao Rd., Xinyi Dist., Taipei",
        latitude: 25.0390,
        longitude: 121.5660,
        hours: ("10:00", "20:00"),
        rating: 4.8,
    },
    DemoShop {
        owner: "Manager C",
        email: "shop3@example.com",
        phone: "02-2222-3333",
        name: "Corner Convenience - Fuxing",
        address: "No. 300, Sec. 3, Zhongxiao E. Rd., Da'an Dist., Taipei",
        latitude: 25.0410,
        longitude: 121.5430,
        hours: ("00:00", "23:59"),
        rating: 4.2,
    },
    DemoShop {
        owner: "Manager D",
        email: "shop4@example.com",
        phone: "02-2345-6789",
        name: "Ren'ai Market Produce",
        address: "No. 1, Sec. 2, Jinan Rd., Zhongzheng Dist., Taipei",
        latitude: 25.0405,
        longitude: 121.5340,
        hours: ("07:00", "19:00"),
        rating: 4.1,
    },
    DemoShop {
        owner: "Manager E",
        email: "shop5@example.com",
        phone: "02-5566-7788",
        name: "Community Food Bank - Dazhi",
        address: "No. 780, Bei'an Rd., Zhongshan Dist., Taipei",
        latitude: 25.0845,
        longitude: 121.5491,
        hours: ("09:00", "21:00"),
        rating: 4.6,
    },
    DemoShop {
        owner: "Manager F",
        email: "shop6@example.com",
        phone: "02-9876-5432",
        name: "Jixiang Community Kitchen",
        address: "No. 211, Mengjia Blvd., Wanhua Dist., Taipei",
        latitude: 25.0365,
        longitude: 121.4970,
        hours: ("11:00", "20:00"),
        rating: 4.0,
    },
    DemoShop {
        owner: "Manager G",
        email: "shop7@example.com",
        phone: "02-6677-8899",
        name: "Sunny Breakfast House",
        address: "No. 188, Sec. 1, Wenhua Rd., Banqiao Dist., New Taipei",
        latitude: 25.0175,
        longitude: 121.4650,
        hours: ("06:00", "13:00"),
        rating: 4.4,
    },
    DemoShop {
        owner: "Manager H",
        email: "shop8@example.com",
        phone: "02-3355-8899",
        name: "Fresh Mart - Sanchong",
        address: "No. 15, Sec. 4, Chongxin Rd., Sanchong Dist., New Taipei",
        latitude: 25.0590,
        longitude: 121.4890,
        hours: ("08:00", "23:30"),
        rating: 4.3,
    },
    DemoShop {
        owner: "Manager I",
        email: "shop9@example.com",
        phone: "02-2233-9911",
        name: "Safe Stop - Yonghe",
        address: "No. 22, Sec. 1, Zhongshan Rd., Yonghe Dist., New Taipei",
        latitude: 25.0041,
        longitude: 121.5168,
        hours: ("00:00", "23:59"),
        rating: 4.5,
    },
    DemoShop {
        owner: "Manager J",
        email: "shop10@example.com",
        phone: "02-1122-3344",
        name: "Temple Food Sharing Point",
        address: "No. 88, Sec. 2, Beixin Rd., Xindian Dist., New Taipei",
        latitude: 24.9710,
        longitude: 121.5380,
        hours: ("10:00", "18:00"),
        rating: 4.7,
    },
];

const FOODS: &[DemoFood] = &[
    DemoFood {
        shop: 0,
        name: "Day-old white loaf",
        category: "Bread",
        quantity: 12,
        expires_in_hours: 24,
        description: "One white loaf, best before tomorrow",
    },
    DemoFood {
        shop: 0,
        name: "Organic veggie pack",
        category: "Produce",
        quantity: 8,
        expires_in_hours: 48,
        description: "Seasonal vegetable mix",
    },
    DemoFood {
        shop: 0,
        name: "Fruit box",
        category: "Fruit",
        quantity: 6,
        expires_in_hours: 72,
        description: "Seasonal fruit selection",
    },
    DemoFood {
        shop: 1,
        name: "Mixed bread bag",
        category: "Bread",
        quantity: 10,
        expires_in_hours: 8,
        description: "Today's bakes, assorted",
    },
    DemoFood {
        shop: 1,
        name: "Salad box",
        category: "Light meals",
        quantity: 5,
        expires_in_hours: 10,
        description: "Fresh garden salad",
    },
    DemoFood {
        shop: 2,
        name: "Rice ball",
        category: "Bento",
        quantity: 15,
        expires_in_hours: 6,
        description: "Tuna rice ball",
    },
    DemoFood {
        shop: 2,
        name: "Hot bento",
        category: "Bento",
        quantity: 7,
        expires_in_hours: 5,
        description: "Convenience store hot meal",
    },
    DemoFood {
        shop: 3,
        name: "Produce box",
        category: "Produce",
        quantity: 9,
        expires_in_hours: 24,
        description: "Today's market vegetables and fruit",
    },
    DemoFood {
        shop: 4,
        name: "Nutrition meal pack",
        category: "Set meal",
        quantity: 11,
        expires_in_hours: 12,
        description: "Staples with side dishes",
    },
    DemoFood {
        shop: 5,
        name: "Soup and noodles",
        category: "Hot food",
        quantity: 6,
        expires_in_hours: 4,
        description: "Freshly cooked soup with noodles",
    },
    DemoFood {
        shop: 6,
        name: "Breakfast set",
        category: "Breakfast",
        quantity: 10,
        expires_in_hours: 6,
        description: "Sandwich and drink",
    },
    DemoFood {
        shop: 7,
        name: "Fresh salad",
        category: "Light meals",
        quantity: 8,
        expires_in_hours: 8,
        description: "Vegetables and fruit salad",
    },
    DemoFood {
        shop: 8,
        name: "Rice ball combo",
        category: "Bento",
        quantity: 20,
        expires_in_hours: 10,
        description: "Assorted rice balls with a drink",
    },
    DemoFood {
        shop: 9,
        name: "Temple vegetarian meal",
        category: "Hot food",
        quantity: 12,
        expires_in_hours: 6,
        description: "Vegetarian dishes cooked at the temple",
    },
];

fn hour(value: &str) -> anyhow::Result<NaiveTime> {
    Ok(NaiveTime::parse_from_str(value, "%H:%M")?)
}

pub async fn cmd_seed(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;

    if store.users().email_exists(ADMIN_EMAIL).await? {
        println!("Demo data already present, nothing to do.");
        return Ok(());
    }

    println!("Creating demo data...");

    store
        .users()
        .create(
            NewUser {
                name: "Demo User".to_string(),
                email: "user@example.com".to_string(),
                phone: Some("0912345678".to_string()),
                password: DEMO_PASSWORD.to_string(),
                role: Role::User,
            },
            &config.security,
        )
        .await?;

    let mut shop_ids = Vec::with_capacity(SHOPS.len());
    for demo in SHOPS {
        let owner = NewUser {
            name: demo.owner.to_string(),
            email: demo.email.to_string(),
            phone: Some(demo.phone.to_string()),
            password: DEMO_PASSWORD.to_string(),
            role: Role::Shop,
        };
        let shop = NewShop {
            name: demo.name.to_string(),
            address: Some(demo.address.to_string()),
            latitude: Some(demo.latitude),
            longitude: Some(demo.longitude),
            opening_time: Some(hour(demo.hours.0)?),
            closing_time: Some(hour(demo.hours.1)?),
            rating: demo.rating,
        };

        let (_, shop) = store
            .users()
            .create_vendor(owner, shop, &config.security)
            .await?;
        shop_ids.push(shop.id);
    }

    let now = Local::now().naive_local();
    for demo in FOODS {
        let Some(&shop_id) = shop_ids.get(demo.shop) else {
            continue;
        };
        store
            .foods()
            .create(
                shop_id,
                NewFood {
                    name: demo.name.to_string(),
                    category: Some(demo.category.to_string()),
                    quantity: demo.quantity,
                    expiry_time: Some(now + Duration::hours(demo.expires_in_hours)),
                    photo_url: None,
                    description: Some(demo.description.to_string()),
                },
            )
            .await?;
    }

    store
        .users()
        .create(
            NewUser {
                name: "Admin".to_string(),
                email: ADMIN_EMAIL.to_string(),
                phone: None,
                password: "admin123".to_string(),
                role: Role::Admin,
            },
            &config.security,
        )
        .await?;

    info!(shops = SHOPS.len(), foods = FOODS.len(), "Demo data created");
    println!("✓ Demo data created.");
    println!("  user@example.com / {DEMO_PASSWORD}");
    println!("  shop1@example.com .. shop10@example.com / {DEMO_PASSWORD}");
    println!("  {ADMIN_EMAIL} / admin123");
    Ok(())
}
