//! The three static diet-plan bundles.

use super::DietPlan;

pub(super) static ACTIVE: DietPlan = DietPlan {
    key: "active",
    title: "Healthy Ageing Maintenance Plan",
    description: "For older adults who are independent and active. Focuses on keeping \
                  muscle mass, bone density and energy steady through balanced meals.",
    goal: "Maintain muscle strength and a healthy weight",
    duration: "Ongoing, review every 3 months",
    breakfast: &[
        "Oatmeal with low-fat milk and a handful of berries",
        "Wholemeal toast with a boiled egg",
        "Soy milk (unsweetened)",
    ],
    lunch: &[
        "Brown rice with steamed fish and two kinds of vegetables",
        "Tofu and mixed vegetable stir-fry",
        "Clear soup with lean meat",
    ],
    dinner: &[
        "Half bowl of rice with skinless chicken and leafy greens",
        "Steamed egg custard",
        "Seasonal vegetables blanched with a little oil",
    ],
    snacks: &[
        "One piece of fresh fruit",
        "Plain yoghurt",
        "Unsalted nuts (a small handful)",
    ],
    supplements: &[
        "Vitamin D if sun exposure is limited",
        "Calcium only if dietary intake is below 1000 mg/day",
    ],
    tips: &[
        "Aim for 1.0 to 1.2 g of protein per kg body weight each day",
        "Drink 6 to 8 glasses of fluid daily",
        "Keep up 150 minutes of moderate exercise per week",
        "Limit salt, sugar and processed foods",
    ],
    expected_outcomes: &[
        "Stable body weight and muscle mass",
        "Steady energy through the day",
        "Lower long-term risk of frailty",
    ],
};

pub(super) static PRE_FRAIL: DietPlan = DietPlan {
    key: "pre_frail",
    title: "Strength Rebuilding Plan",
    description: "For older adults showing early signs of frailty such as slower walking, \
                  tiredness or recent weight loss. Raises protein and energy intake to \
                  rebuild strength.",
    goal: "Stop weight loss and rebuild muscle strength",
    duration: "12 weeks, then reassess",
    breakfast: &[
        "Congee with minced lean pork and egg",
        "High-calcium milk or soy milk",
        "Soft wholemeal bread with peanut butter",
    ],
    lunch: &[
        "Soft rice with braised fish fillet and tofu",
        "Finely chopped vegetables cooked until tender",
        "Lean meat and vegetable soup",
    ],
    dinner: &[
        "Noodles in soup with shredded chicken and greens",
        "Steamed egg with minced meat",
        "Mashed pumpkin or sweet potato",
    ],
    snacks: &[
        "Milk or a high-protein yoghurt between meals",
        "Soft fruit such as banana or papaya",
        "Red bean soup with little sugar",
    ],
    supplements: &[
        "Oral nutritional supplement drink once a day if appetite is poor",
        "Vitamin D",
        "Whey or soy protein powder, as advised by a dietitian",
    ],
    tips: &[
        "Eat 5 to 6 small meals instead of 3 large ones",
        "Include a protein food at every meal",
        "Combine meals with light resistance exercise 2 to 3 times a week",
        "Weigh weekly and report any further loss",
    ],
    expected_outcomes: &[
        "Weight stabilised within 4 weeks",
        "Improved grip strength and walking speed",
        "Reduced fall risk",
    ],
};

pub(super) static FRAIL: DietPlan = DietPlan {
    key: "frail",
    title: "Intensive Nutrition Support Plan",
    description: "For frail older adults with low appetite, chewing or swallowing \
                  difficulty, or significant weight loss. Uses soft, energy-dense food \
                  to meet daily needs.",
    goal: "Meet daily energy and protein needs and prevent malnutrition",
    duration: "8 weeks with close monitoring",
    breakfast: &[
        "Smooth congee blended with egg and fish",
        "Full-cream milk or nutritional supplement drink",
        "Soft steamed bun",
    ],
    lunch: &[
        "Minced or pureed meat with soft rice",
        "Pureed vegetables with a little oil for extra energy",
        "Thickened soup if swallowing is difficult",
    ],
    dinner: &[
        "Soft noodles with minced fish balls",
        "Silken tofu with sauce",
        "Mashed potato with milk",
    ],
    snacks: &[
        "Nutritional supplement drink",
        "Custard or pudding",
        "Fruit puree",
    ],
    supplements: &[
        "Complete oral nutritional supplement 1 to 2 times a day",
        "Vitamin D and calcium",
        "Multivitamin, as advised by a doctor",
    ],
    tips: &[
        "Adjust food texture to chewing and swallowing ability",
        "Serve small portions often, every 2 to 3 hours",
        "Add oil, milk powder or egg to dishes to raise energy",
        "Ask a doctor or dietitian to review medications affecting appetite",
    ],
    expected_outcomes: &[
        "Daily intake meets energy and protein targets",
        "No further weight loss",
        "Better recovery from illness and lower complication risk",
    ],
};
