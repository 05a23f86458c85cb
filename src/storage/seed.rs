//! Demo catalog data.
//!
//! Prices deliberately mix numbers, currency strings and nulls, and a few
//! rows carry (0,0) coordinates, matching what real supplier feeds deliver.

pub(super) const DEMO_CATALOG_SQL: &str = r"
INSERT OR IGNORE INTO Hotels
    (id, name, city, address, price_per_night, rating, latitude, longitude, amenities, images, description)
VALUES
    (1, 'Winter Palace Luxor', 'Luxor', 'Corniche El Nile', '$180', 4.7, 25.6989, 32.6398,
        'pool|garden|spa|wifi', 'https://img.example.com/hotels/winter-palace-1.jpg|https://img.example.com/hotels/winter-palace-2.jpg',
        'Historic Victorian palace hotel on the east bank overlooking the Nile.'),
    (2, 'Hilton Luxor Resort & Spa', 'Luxor', 'New Karnak', 145, 4.5, 25.7211, 32.6570,
        'pool|spa|restaurant|wifi', 'https://img.example.com/hotels/hilton-luxor.jpg',
        'Resort north of Karnak with infinity pools facing the river.'),
    (3, 'Nile Budget Inn', 'Luxor', 'Television Street', '45.00 USD', 3.9, 25.6950, 32.6425,
        'wifi|breakfast', 'https://img.example.com/hotels/nile-inn.jpg',
        'Simple rooms a short walk from Luxor Temple.'),
    (4, 'Sunrise Boutique', 'Luxor', 'West Bank', 95, 4.1, 0, 0,
        'wifi', '', 'West bank guesthouse awaiting geocoding.'),
    (5, 'Karnak Palms Hotel', 'Luxor', 'Karnak Road', NULL, 3.6, 25.7150, 32.6540,
        'wifi|pool', '', 'Rates on request.'),
    (10, 'Marriott Mena House', 'Cairo', 'Pyramids Road', '$260', 4.8, 29.9860, 31.1340,
        'pool|spa|golf|wifi', 'https://img.example.com/hotels/mena-house.jpg',
        'Former royal lodge with pyramid views.'),
    (11, 'Steigenberger Tahrir', 'Cairo', 'Tahrir Square', 120, 4.3, 30.0459, 31.2357,
        'restaurant|wifi|gym', 'https://img.example.com/hotels/tahrir.jpg',
        'Central hotel beside the Egyptian Museum.'),
    (20, 'Old Cataract Aswan', 'Aswan', 'Abtal El Tahrir', '$310', 4.9, 24.0820, 32.8870,
        'pool|spa|terrace', 'https://img.example.com/hotels/old-cataract.jpg',
        'Legendary hotel above the first cataract.'),
    (21, 'Philae Hotel', 'Aswan', 'Corniche', 70, 4.0, 24.0900, 32.8990,
        'wifi|breakfast', 'https://img.example.com/hotels/philae.jpg',
        'Riverside hotel near the souk.'),
    (30, 'Steigenberger Cecil', 'Alexandria', 'Saad Zaghloul Square', 110, 4.2, 31.2001, 29.8990,
        'sea view|wifi', 'https://img.example.com/hotels/cecil.jpg',
        'Art deco landmark on the eastern harbour.'),
    (40, 'Steigenberger Al Dau', 'Hurghada', 'Yussif Afifi Road', '$150', 4.6, 27.1790, 33.8300,
        'beach|pool|diving', 'https://img.example.com/hotels/al-dau.jpg',
        'Beach resort with a house reef.'),
    (50, 'Pyramids View Inn', 'Giza', 'Abu Al Hul Street', 60, 4.4, 29.9750, 31.1370,
        'rooftop|breakfast', 'https://img.example.com/hotels/pyramids-view.jpg',
        'Family guesthouse facing the Sphinx.');

INSERT OR IGNORE INTO Attractions
    (id, name, city, category, ticket_price, rating, latitude, longitude, duration_hours, images, description)
VALUES
    (1, 'Karnak Temple', 'Luxor', 'history', 20, 4.9, 25.7188, 32.6573, 3,
        'https://img.example.com/sights/karnak.jpg', 'Vast temple complex dedicated to Amun-Ra.'),
    (2, 'Valley of the Kings', 'Luxor', 'history', '$25', 4.8, 25.7402, 32.6014, 4,
        'https://img.example.com/sights/valley-kings.jpg', 'Royal tombs of the New Kingdom pharaohs.'),
    (3, 'Luxor Temple', 'Luxor', 'history', 15, 4.7, 25.6995, 32.6391, 2,
        'https://img.example.com/sights/luxor-temple.jpg', 'Riverside temple, best visited at dusk.'),
    (4, 'Temple of Hatshepsut', 'Luxor', 'history', '12.50', 4.6, 25.7380, 32.6065, 2,
        'https://img.example.com/sights/hatshepsut.jpg', 'Terraced mortuary temple at Deir el-Bahari.'),
    (5, 'Hot Air Balloon Ride', 'Luxor', 'adventure', '$95', 4.8, 25.7300, 32.6100, 3,
        'https://img.example.com/sights/balloon.jpg', 'Sunrise flight over the west bank.'),
    (6, 'Luxor Museum', 'Luxor', 'culture', 10, 4.5, 25.7074, 32.6442, 2,
        'https://img.example.com/sights/luxor-museum.jpg', 'Compact museum of Theban antiquities.'),
    (7, 'Colossi of Memnon', 'Luxor', 'history', 0, 4.2, 25.7205, 32.6105, 1,
        'https://img.example.com/sights/memnon.jpg', 'Twin statues of Amenhotep III.'),
    (8, 'Felucca Sunset Sail', 'Luxor', 'leisure', 'EGP 300', 4.4, 0, 0, 1.5,
        '', 'Traditional sailboat trip on the Nile.'),
    (10, 'Egyptian Museum', 'Cairo', 'culture', 30, 4.7, 30.0478, 31.2336, 3,
        'https://img.example.com/sights/egyptian-museum.jpg', 'Treasures of Tutankhamun and more.'),
    (11, 'Khan el-Khalili', 'Cairo', 'shopping', 5, 4.5, 30.0477, 31.2623, 2,
        'https://img.example.com/sights/khan.jpg', 'Medieval bazaar in Islamic Cairo.'),
    (12, 'Citadel of Saladin', 'Cairo', 'history', 20, 4.6, 30.0299, 31.2611, 2,
        'https://img.example.com/sights/citadel.jpg', 'Hilltop fortress and Muhammad Ali Mosque.'),
    (13, 'Al-Azhar Park', 'Cairo', 'nature', '$3', 4.6, 30.0407, 31.2636, 1.5,
        'https://img.example.com/sights/azhar-park.jpg', 'Gardens with views over the old city.'),
    (20, 'Philae Temple', 'Aswan', 'history', 18, 4.8, 24.0255, 32.8844, 2,
        'https://img.example.com/sights/philae.jpg', 'Island temple of Isis.'),
    (21, 'Abu Simbel', 'Aswan', 'history', '$45', 4.9, 22.3372, 31.6258, 6,
        'https://img.example.com/sights/abu-simbel.jpg', 'Rock temples of Ramesses II.'),
    (22, 'Nubian Village', 'Aswan', 'culture', 10, 4.4, 24.1100, 32.8800, 3,
        'https://img.example.com/sights/nubian-village.jpg', 'Colourful village reached by boat.'),
    (30, 'Qaitbay Citadel', 'Alexandria', 'history', 8, 4.5, 31.2140, 29.8856, 1.5,
        'https://img.example.com/sights/qaitbay.jpg', 'Fortress on the site of the Pharos.'),
    (31, 'Bibliotheca Alexandrina', 'Alexandria', 'culture', 12, 4.7, 31.2089, 29.9092, 2,
        'https://img.example.com/sights/bibliotheca.jpg', 'Modern library and museums.'),
    (40, 'Giftun Island Snorkelling', 'Hurghada', 'nature', '$40', 4.6, 27.2170, 33.9480, 6,
        'https://img.example.com/sights/giftun.jpg', 'Boat trip to coral reefs.'),
    (50, 'Great Pyramid of Khufu', 'Giza', 'history', 25, 4.9, 29.9792, 31.1342, 2,
        'https://img.example.com/sights/khufu.jpg', 'Last standing wonder of the ancient world.'),
    (51, 'Great Sphinx', 'Giza', 'history', 0, 4.8, 29.9753, 31.1376, 1,
        'https://img.example.com/sights/sphinx.jpg', 'Limestone guardian of the plateau.'),
    (52, 'Grand Egyptian Museum', 'Giza', 'culture', '$28', 4.8, 29.9947, 31.1197, 4,
        'https://img.example.com/sights/gem.jpg', 'New museum beside the pyramids.');

INSERT OR IGNORE INTO Vehicles
    (id, name, city, vehicle_type, price_per_day, capacity, rating, latitude, longitude, features, images)
VALUES
    (1, 'Toyota Corolla', 'Luxor', 'sedan', 40, 4, 4.3, 25.6960, 32.6420,
        'air conditioning|automatic', 'https://img.example.com/cars/corolla.jpg'),
    (2, 'Hyundai H1 Van with Driver', 'Luxor', 'van', '$85', 8, 4.6, 25.6970, 32.6400,
        'driver|air conditioning', 'https://img.example.com/cars/h1.jpg'),
    (3, 'Mercedes E-Class Chauffeur', 'Luxor', 'luxury', '$250', 3, 4.9, 25.6980, 32.6390,
        'chauffeur|wifi|water', 'https://img.example.com/cars/eclass.jpg'),
    (10, 'Kia Cerato', 'Cairo', 'sedan', 35, 4, 4.1, 30.0444, 31.2357,
        'air conditioning', 'https://img.example.com/cars/cerato.jpg'),
    (20, 'Toyota Hiace', 'Aswan', 'van', 70, 10, 4.4, 24.0889, 32.8998,
        'driver|air conditioning', 'https://img.example.com/cars/hiace.jpg'),
    (40, 'Jeep Wrangler', 'Hurghada', 'suv', 95, 4, 4.5, 27.2579, 33.8116,
        '4x4|desert safari', 'https://img.example.com/cars/wrangler.jpg');

INSERT OR IGNORE INTO Availability (entity_kind, entity_id, date, units_available)
VALUES
    ('hotel', 1, '2026-12-24', 0),
    ('hotel', 1, '2026-12-25', 0),
    ('hotel', 2, '2026-12-24', 3),
    ('vehicle', 1, '2026-03-10', 0),
    ('attraction', 5, '2026-06-15', 0);
";
